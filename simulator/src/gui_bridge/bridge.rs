use crate::gui_bridge::model::{BufferExport, IngestReply, LifecycleReply};
use pacecore::{Fix, PassiveSource, TrackSnapshot, Tracker};
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard},
    thread,
};
use tokio::runtime::Builder;
use tokio::sync::watch;
use warp::Filter;

type SharedTracker = Arc<Mutex<Tracker<PassiveSource>>>;

fn lock(tracker: &SharedTracker) -> MutexGuard<'_, Tracker<PassiveSource>> {
    tracker.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// HTTP surface between a fix source, the tracker and a polling presentation layer.
///
/// Writes go through the tracker mutex; reads come from the published snapshot.
pub struct GuiBridge {
    tracker: SharedTracker,
    snapshots: watch::Receiver<Arc<TrackSnapshot>>,
}

impl GuiBridge {
    pub fn new(tracker: Tracker<PassiveSource>) -> Self {
        let snapshots = tracker.subscribe();
        Self {
            tracker: Arc::new(Mutex::new(tracker)),
            snapshots,
        }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
        let snapshots = self.snapshots.clone();
        let snapshot_filter = warp::any().map(move || snapshots.borrow().clone());
        let tracker = self.tracker.clone();
        let tracker_filter = warp::any().map(move || tracker.clone());

        let metrics_route = warp::path("metrics")
            .and(warp::path::end())
            .and(warp::get())
            .and(snapshot_filter.clone())
            .map(|snapshot: Arc<TrackSnapshot>| warp::reply::json(&*snapshot));

        let track_route = warp::path("track")
            .and(warp::path::end())
            .and(warp::get())
            .and(snapshot_filter.clone())
            .map(|snapshot: Arc<TrackSnapshot>| {
                warp::reply::json(&BufferExport::new("track", snapshot.track.clone()))
            });

        let debug_route = warp::path("debug")
            .and(warp::path::end())
            .and(warp::get())
            .and(snapshot_filter)
            .map(|snapshot: Arc<TrackSnapshot>| {
                warp::reply::json(&BufferExport::new("debug", snapshot.debug.clone()))
            });

        let ingest_route = warp::path("ingest")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(tracker_filter.clone())
            .map(|batch: Vec<Fix>, tracker: SharedTracker| {
                let mut guard = lock(&tracker);
                let accepted = guard.ingest(&batch);
                warp::reply::json(&IngestReply {
                    received: batch.len(),
                    accepted,
                    track_count: guard.track_count(),
                })
            });

        let start_route = lifecycle_route("start", tracker_filter.clone(), Tracker::start);
        let stop_route = lifecycle_route("stop", tracker_filter.clone(), Tracker::stop);
        let reset_route = lifecycle_route("reset", tracker_filter, Tracker::reset);

        metrics_route
            .or(track_route)
            .or(debug_route)
            .or(ingest_route)
            .or(start_route)
            .or(stop_route)
            .or(reset_route)
    }

    /// Serves the routes on a background thread with its own runtime.
    pub fn serve(&self, addr: SocketAddr) {
        let routes = self.routes();
        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    log::error!("failed to build bridge runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                warp::serve(routes).run(addr).await;
            });
        });
        log::info!("bridge listening on {}", addr);
    }

    pub fn publish_status(&self, message: &str) {
        log::info!("[bridge] {}", message);
    }

    pub fn with_tracker<R>(&self, f: impl FnOnce(&mut Tracker<PassiveSource>) -> R) -> R {
        let mut guard = lock(&self.tracker);
        f(&mut guard)
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> Arc<TrackSnapshot> {
        self.snapshots.borrow().clone()
    }
}

fn lifecycle_route(
    name: &'static str,
    tracker_filter: impl Filter<Extract = (SharedTracker,), Error = std::convert::Infallible>
        + Clone
        + Send
        + Sync
        + 'static,
    action: fn(&mut Tracker<PassiveSource>),
) -> impl Filter<Extract = (warp::reply::Json,), Error = warp::Rejection> + Clone {
    warp::path(name)
        .and(warp::path::end())
        .and(warp::post())
        .and(tracker_filter)
        .map(move |tracker: SharedTracker| {
            let mut guard = lock(&tracker);
            action(&mut guard);
            warp::reply::json(&LifecycleReply {
                state: guard.state(),
                track_count: guard.track_count(),
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use pacecore::math::geodesy::destination;
    use pacecore::{TrackerConfig, TrackerState};
    use serde_json::Value;

    fn bridge() -> GuiBridge {
        let tracker = Tracker::new(PassiveSource, TrackerConfig::default()).unwrap();
        GuiBridge::new(tracker)
    }

    fn recent_fixes() -> Vec<Fix> {
        let now = Utc::now();
        (0..3)
            .map(|i| {
                let (lat, lon) = destination(52.0, 5.0, 0.0, 100.0 * i as f64);
                let ts = now - Duration::seconds(10 - 5 * i as i64);
                Fix::new(lat, lon, 0.0, 5.0, 3.0, ts)
            })
            .collect()
    }

    fn body<B: AsRef<[u8]>>(response: &warp::http::Response<B>) -> Value {
        serde_json::from_slice(response.body().as_ref()).unwrap()
    }

    #[tokio::test]
    async fn ingest_updates_metrics() {
        let bridge = bridge();
        bridge.with_tracker(|tracker| tracker.start());
        let routes = bridge.routes();

        let response = warp::test::request()
            .method("POST")
            .path("/ingest")
            .json(&recent_fixes())
            .reply(&routes)
            .await;
        assert_eq!(response.status(), 200);
        assert_eq!(body(&response)["accepted"], 3);

        let response = warp::test::request().path("/metrics").reply(&routes).await;
        let metrics = body(&response);
        assert_eq!(metrics["track_count"], 3);
        assert_eq!(metrics["state"], "tracking");
        assert_eq!(metrics["distance"], "200.0 m");
        assert_eq!(bridge.snapshot().track_count, 3);
    }

    #[tokio::test]
    async fn ingest_while_idle_is_ignored() {
        let bridge = bridge();
        let routes = bridge.routes();
        let response = warp::test::request()
            .method("POST")
            .path("/ingest")
            .json(&recent_fixes())
            .reply(&routes)
            .await;
        assert_eq!(body(&response)["accepted"], 0);
        assert_eq!(bridge.snapshot().debug_count, 0);
    }

    #[tokio::test]
    async fn lifecycle_routes_drive_the_tracker() {
        let bridge = bridge();
        let routes = bridge.routes();

        let response = warp::test::request()
            .method("POST")
            .path("/start")
            .reply(&routes)
            .await;
        assert_eq!(body(&response)["state"], "tracking");

        warp::test::request()
            .method("POST")
            .path("/ingest")
            .json(&recent_fixes())
            .reply(&routes)
            .await;
        let exported = body(&warp::test::request().path("/track").reply(&routes).await);
        assert_eq!(exported["count"], 3);

        let response = warp::test::request()
            .method("POST")
            .path("/stop")
            .reply(&routes)
            .await;
        assert_eq!(body(&response)["state"], "idle");
        assert_eq!(bridge.snapshot().state, TrackerState::Idle);

        let debug = body(&warp::test::request().path("/debug").reply(&routes).await);
        assert_eq!(debug["count"], 0);
    }

    #[tokio::test]
    async fn malformed_batch_is_rejected() {
        let bridge = bridge();
        let routes = bridge.routes();
        let response = warp::test::request()
            .method("POST")
            .path("/ingest")
            .body("[{\"latitude\": \"north\"}]")
            .reply(&routes)
            .await;
        assert_eq!(response.status(), 400);
    }
}
