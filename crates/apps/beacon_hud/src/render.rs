use std::io::{self, Write};

use bounty::{BeaconView, BountyPanel, Phase, ViewModel};
use scene::{Location, Status};

/// Draws the full HUD as plain text.
pub fn render_text<W: Write>(out: &mut W, view: &ViewModel) -> io::Result<()> {
    let h = &view.header;
    writeln!(
        out,
        "== BEACON BOUNTY ==  wallet {}  stale {}  t={:.1}s",
        h.balance, h.stale_count, h.now_s
    )?;

    writeln!(out, "-- live feed --")?;
    if view.feed.is_empty() {
        writeln!(out, "  (quiet)")?;
    }
    for line in &view.feed {
        writeln!(out, "  [{:>6.1}s] {}", line.at_s, line.message)?;
    }

    writeln!(out, "-- beacons --")?;
    for beacon in &view.beacons {
        writeln!(out, "{}", beacon_line(beacon))?;
    }

    if let Some(panel) = &view.panel {
        writeln!(out, "-- bounty panel --")?;
        render_panel(out, panel)?;
    }
    writeln!(out)
}

/// One JSON document per frame, for piping into other tools.
pub fn render_json<W: Write>(out: &mut W, view: &ViewModel) -> io::Result<()> {
    serde_json::to_writer(&mut *out, view)?;
    writeln!(out)
}

fn beacon_line(b: &BeaconView) -> String {
    let marker = if b.selected { '>' } else { ' ' };
    let status = match (b.status, b.verifying) {
        (_, true) => "VERIFYING",
        (Status::Stale, false) => "STALE",
        (Status::Fresh, false) => "fresh",
    };
    format!(
        " {marker} [{}] {:<22} {:<9} {:<9} ({:.1}, {:.1}, {:.1})",
        b.id, b.name, b.category, status, b.position[0], b.position[1], b.position[2]
    )
}

fn render_panel<W: Write>(out: &mut W, panel: &BountyPanel) -> io::Result<()> {
    writeln!(
        out,
        "  {} ({})  status: {}  data age: {} days",
        panel.name, panel.category, panel.status, panel.days_since_verified
    )?;
    match &panel.session {
        Some(session) => {
            writeln!(
                out,
                "  verification #{}: {}  [{:.1}s, image {}]",
                session.id,
                panel.phase.label(),
                session.elapsed_s,
                session.image
            )?;
            if let Some(note) = &session.note {
                writeln!(out, "  note: {note}")?;
            }
            if let Some(verdict) = session.verdict {
                writeln!(out, "  {verdict}")?;
            }
        }
        None if panel.can_submit => {
            if let Some(bounty) = panel.bounty {
                writeln!(out, "  bounty available: {bounty}")?;
            }
            writeln!(out, "  type `submit <image> [note]` to claim it")?;
        }
        None if panel.phase != Phase::Idle => {
            writeln!(out, "  another verification is running")?;
        }
        None => writeln!(out, "  data is fresh, nothing to claim")?,
    }
    Ok(())
}

pub fn render_locations<'a, W: Write>(
    out: &mut W,
    title: &str,
    locations: impl IntoIterator<Item = &'a Location>,
) -> io::Result<()> {
    writeln!(out, "-- {title} --")?;
    let mut any = false;
    for l in locations {
        any = true;
        writeln!(
            out,
            "  [{}] {} ({}, {})",
            l.id, l.name, l.category, l.status
        )?;
    }
    if !any {
        writeln!(out, "  (none)")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{render_json, render_text};
    use bounty::{App, BountyConfig, Submission};
    use foundation::ids::LocationId;
    use foundation::time::Time;

    fn text(app: &App) -> String {
        let mut buf = Vec::new();
        render_text(&mut buf, &app.view()).expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn idle_hud_has_no_panel() {
        let app = App::new(&BountyConfig::default()).expect("app");
        let out = text(&app);
        assert!(out.contains("wallet 100.00"));
        assert!(out.contains("The Grand Cafe"));
        assert!(!out.contains("bounty panel"));
    }

    #[test]
    fn panel_shows_bounty_then_progress() {
        let mut app = App::new(&BountyConfig::default()).expect("app");
        app.select_beacon(LocationId(1)).expect("select");
        let out = text(&app);
        assert!(out.contains("bounty available: 15.00"));
        assert!(out.contains(" > [1] The Grand Cafe"));

        app.submit_bounty(Submission::with_image("photo.jpg"))
            .expect("submit");
        app.advance_to(Time(2.0));
        let out = text(&app);
        assert!(out.contains("verification #1: cross-referencing signals"));
        assert!(out.contains("VERIFYING"));
    }

    #[test]
    fn json_frame_is_one_line() {
        let app = App::new(&BountyConfig::default()).expect("app");
        let mut buf = Vec::new();
        render_json(&mut buf, &app.view()).expect("render");
        let s = String::from_utf8(buf).expect("utf8");
        assert_eq!(s.lines().count(), 1);
        let v: serde_json::Value = serde_json::from_str(&s).expect("json");
        assert_eq!(v["beacons"].as_array().map(|a| a.len()), Some(5));
    }
}
