use serde::Serialize;

use scene::{Category, Status};

use crate::app::App;
use crate::verification::{APPROVAL_NOTE, Phase};
use crate::wallet::Credits;

/// Everything the presentation layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub header: Header,
    pub feed: Vec<FeedLine>,
    /// Present exactly when a location is selected.
    pub panel: Option<BountyPanel>,
    pub beacons: Vec<BeaconView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub balance: Credits,
    pub stale_count: usize,
    pub now_s: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedLine {
    pub at_s: f64,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeaconView {
    pub id: u32,
    pub name: String,
    pub category: Category,
    pub status: Status,
    pub position: [f64; 3],
    pub selected: bool,
    /// A verification for this beacon is running.
    pub verifying: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BountyPanel {
    pub location_id: u32,
    pub name: String,
    pub category: Category,
    pub status: Status,
    pub days_since_verified: u32,
    /// What a bounty would pay, shown only while one can be claimed.
    pub bounty: Option<Credits>,
    pub phase: Phase,
    pub can_submit: bool,
    pub session: Option<SessionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub id: u64,
    pub elapsed_s: f64,
    pub image: String,
    pub note: Option<String>,
    pub verdict: Option<&'static str>,
}

impl ViewModel {
    pub fn from_app(app: &App) -> Self {
        let session = app.session();
        let verifying = session.map(|s| s.target);

        let beacons = app
            .locations()
            .iter()
            .map(|l| BeaconView {
                id: l.id.get(),
                name: l.name.clone(),
                category: l.category,
                status: l.status,
                position: l.position.to_array(),
                selected: app.selected_id() == Some(l.id),
                verifying: verifying == Some(l.id),
            })
            .collect();

        let panel = app.current().map(|l| {
            let session_view = session.filter(|s| s.target == l.id).map(|s| SessionView {
                id: s.id.0,
                elapsed_s: app.now().since(s.started_at),
                image: s.evidence.image.as_str().to_string(),
                note: s.evidence.note.clone(),
                verdict: (s.phase == Phase::Verdict).then_some(APPROVAL_NOTE),
            });
            let stale = l.status == Status::Stale;
            BountyPanel {
                location_id: l.id.get(),
                name: l.name.clone(),
                category: l.category,
                status: l.status,
                days_since_verified: l.days_since_verified,
                bounty: stale.then(|| app.reward_for(l)),
                phase: app.phase(),
                can_submit: stale && session.is_none(),
                session: session_view,
            }
        });

        let feed = app
            .feed()
            .recent(usize::MAX)
            .into_iter()
            .map(|e| FeedLine {
                at_s: e.at.seconds(),
                kind: e.kind,
                message: e.message.clone(),
            })
            .collect();

        ViewModel {
            header: Header {
                balance: app.balance(),
                stale_count: app.registry().stale().count(),
                now_s: app.now().seconds(),
            },
            feed,
            panel,
            beacons,
        }
    }
}

impl App {
    pub fn view(&self) -> ViewModel {
        ViewModel::from_app(self)
    }
}
