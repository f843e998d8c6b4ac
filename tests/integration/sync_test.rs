//! End-to-end tests for the sync engine with file-backed persistence

use std::cell::RefCell;
use std::rc::Rc;

use tempfile::TempDir;

use readalong::remote::{ExternalControlBridge, RemoteAction, RemoteControlSurface, SurfaceError};
use readalong::{
    Config, FileStore, HighlightChange, KeyValueStore, PlaybackEngine, Resource, ResourceKey,
    SimulatedEngine, SyncEngine, SyncObserver, SyncState, TransportCommand,
};

use crate::helpers::{article, ARTICLE_LENGTHS};

#[derive(Debug, Default)]
struct Highlights(Vec<HighlightChange>);

impl SyncObserver for Highlights {
    fn on_highlight_change(&mut self, change: HighlightChange) {
        self.0.push(change);
    }

    fn on_time_display_change(&mut self, _elapsed: &str, _total: &str) {}
}

type Session = SyncEngine<SimulatedEngine, Highlights>;

fn open(store: Rc<dyn KeyValueStore>, key: &str, duration: f64) -> Session {
    let mut sync = SyncEngine::new(
        SimulatedEngine::new(),
        Highlights::default(),
        store,
        Config::default().sync_options(),
    );
    sync.load(Resource::from_text(ResourceKey::new(key), &article()));
    sync.transport_mut().engine_mut().load(duration);
    sync.pump();
    sync
}

fn play_for(sync: &mut Session, seconds: f64) {
    sync.execute(TransportCommand::Play);
    sync.pump();
    let mut left = seconds;
    while left > 0.0 && sync.state() != SyncState::Ended {
        let step = left.min(0.5);
        sync.transport_mut().engine_mut().advance(step);
        sync.pump();
        left -= step;
    }
}

fn file_store(dir: &TempDir) -> Rc<dyn KeyValueStore> {
    Rc::new(FileStore::open(dir.path().join("state.json")).unwrap())
}

#[test]
fn article_text_yields_expected_segments() {
    let sync = open(Rc::new(readalong::MemoryStore::new()), "a", 30.0);
    let resource = sync.resource().unwrap();
    assert_eq!(resource.segment_lengths, ARTICLE_LENGTHS.to_vec());
    let ends = sync.boundaries().unwrap().ends();
    for (end, expected) in ends.iter().zip([10.0, 15.0, 30.0]) {
        assert!((end - expected).abs() < 1e-9, "{:?}", ends);
    }
}

#[test]
fn position_survives_reopening_the_store() {
    let dir = TempDir::new().unwrap();

    {
        let mut sync = open(file_store(&dir), "article-7", 30.0);
        play_for(&mut sync, 12.0);
        sync.execute(TransportCommand::Pause);
        sync.pump();
    }

    let sync = open(file_store(&dir), "article-7", 30.0);
    assert_eq!(sync.transport().engine().current_time(), 12.0);
    assert_eq!(sync.active_segment(), Some(1));
    assert_eq!(sync.observer().0.len(), 1);
    assert_eq!(sync.observer().0[0].previous, None);
}

#[test]
fn finished_article_resumes_just_before_the_end() {
    let dir = TempDir::new().unwrap();

    {
        let mut sync = open(file_store(&dir), "done", 30.0);
        play_for(&mut sync, 60.0);
        assert_eq!(sync.state(), SyncState::Ended);
    }

    let sync = open(file_store(&dir), "done", 30.0);
    let t = sync.transport().engine().current_time();
    assert!(t < 30.0 && t >= 29.9 - 1e-9, "resumed at {}", t);
    assert_eq!(sync.active_segment(), Some(2));
}

#[test]
fn shorter_media_clamps_the_restored_position() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    store.set("playbackPos-clip", "500").unwrap();

    let sync = open(file_store(&dir), "clip", 30.0);
    let t = sync.transport().engine().current_time();
    assert!((t - 29.9).abs() < 1e-9, "resumed at {}", t);
}

#[test]
fn rate_is_shared_between_articles() {
    let dir = TempDir::new().unwrap();

    {
        let mut sync = open(file_store(&dir), "first", 30.0);
        assert_eq!(sync.rate_up(), 1.1);
        assert_eq!(sync.rate_up(), 1.25);
    }

    let sync = open(file_store(&dir), "second", 30.0);
    assert_eq!(sync.rates().current(), 1.25);
    assert_eq!(sync.transport().engine().playback_rate(), 1.25);
}

#[test]
fn navigating_away_keeps_positions_separate() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    let mut sync = open(store.clone(), "one", 30.0);
    play_for(&mut sync, 4.0);

    sync.load(Resource::from_text(ResourceKey::new("two"), &article()));
    sync.transport_mut().engine_mut().load(30.0);
    sync.pump();
    assert_eq!(sync.transport().engine().current_time(), 0.0);
    play_for(&mut sync, 20.0);
    sync.execute(TransportCommand::Pause);
    sync.pump();

    let one: f64 = store.get("playbackPos-one").unwrap().parse().unwrap();
    let two: f64 = store.get("playbackPos-two").unwrap().parse().unwrap();
    assert!(one <= 4.0, "one saved at {}", one);
    assert_eq!(two, 20.0);
}

#[test]
fn seek_fraction_highlights_matching_paragraph() {
    let mut sync = open(Rc::new(readalong::MemoryStore::new()), "f", 30.0);
    sync.execute(TransportCommand::SeekFraction(0.4));
    sync.pump();
    assert_eq!(sync.active_segment(), Some(1));
    sync.execute(TransportCommand::SkipForward);
    sync.pump();
    assert_eq!(sync.transport().engine().current_time(), 30.0);
    assert_eq!(sync.active_segment(), Some(2));
    sync.execute(TransportCommand::SkipBackward);
    sync.pump();
    assert_eq!(sync.transport().engine().current_time(), 15.0);
    assert_eq!(sync.active_segment(), Some(1));
}

/// Surface that delivers scripted action names.
#[derive(Default)]
struct ScriptedSurface {
    registered: Rc<RefCell<Vec<RemoteAction>>>,
}

impl RemoteControlSurface for ScriptedSurface {
    type Event = &'static str;

    fn name(&self) -> &'static str {
        "scripted"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn register(&mut self, actions: &[RemoteAction]) -> Result<(), SurfaceError> {
        self.registered.borrow_mut().extend_from_slice(actions);
        Ok(())
    }

    fn unregister(&mut self) {
        self.registered.borrow_mut().clear();
    }

    fn translate(&self, event: &&'static str) -> Option<RemoteAction> {
        RemoteAction::ALL.into_iter().find(|a| a.name() == *event)
    }
}

#[test]
fn remote_actions_drive_the_session() {
    let registered = Rc::new(RefCell::new(Vec::new()));
    let mut sync = open(Rc::new(readalong::MemoryStore::new()), "remote", 60.0);

    {
        let bridge = ExternalControlBridge::new(Some(ScriptedSurface {
            registered: registered.clone(),
        }));
        assert!(bridge.is_active());
        assert_eq!(registered.borrow().len(), RemoteAction::ALL.len());

        let play = RemoteAction::Play.name();
        assert_eq!(bridge.handle(&play, sync.transport_mut()), Some(RemoteAction::Play));
        sync.pump();
        assert_eq!(sync.state(), SyncState::Playing);

        let forward = RemoteAction::SeekForward.name();
        bridge.handle(&forward, sync.transport_mut());
        sync.pump();
        assert_eq!(sync.transport().engine().current_time(), 30.0);

        let mute = RemoteAction::ToggleMute.name();
        bridge.handle(&mute, sync.transport_mut());
        assert!(sync.transport().engine().is_muted());

        assert_eq!(bridge.handle(&"volume-up", sync.transport_mut()), None);
    }

    assert!(registered.borrow().is_empty());
}

#[test]
fn unavailable_surface_leaves_bridge_inert() {
    struct Missing;

    impl RemoteControlSurface for Missing {
        type Event = ();

        fn name(&self) -> &'static str {
            "missing"
        }

        fn is_available(&self) -> bool {
            false
        }

        fn register(&mut self, _actions: &[RemoteAction]) -> Result<(), SurfaceError> {
            panic!("must not register an unavailable surface");
        }

        fn translate(&self, _event: &()) -> Option<RemoteAction> {
            Some(RemoteAction::Play)
        }
    }

    let mut sync = open(Rc::new(readalong::MemoryStore::new()), "inert", 60.0);
    let bridge = ExternalControlBridge::new(Some(Missing));
    assert!(!bridge.is_active());
    assert_eq!(bridge.handle(&(), sync.transport_mut()), None);
    assert!(!bridge.dispatch(RemoteAction::Play, sync.transport_mut()));
    assert!(sync.transport().engine().is_paused());
}
