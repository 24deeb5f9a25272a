use std::{path::PathBuf, time::Duration};

use timemask::{
    Command, CompositorKind, Frame, FrameDims, MaskPlaylist, SessionEvent, Settings, StaticMasks,
    TemporalMask, TemporalSession,
};

const W: u32 = 4;
const H: u32 = 2;

fn dims() -> FrameDims {
    FrameDims::rgb(W, H).unwrap()
}

fn playlist() -> MaskPlaylist {
    let masks = StaticMasks::new()
        .with("historical", TemporalMask::uniform(W, H, 0))
        .with("current", TemporalMask::uniform(W, H, 255));
    MaskPlaylist::new(Box::new(masks)).unwrap()
}

fn settings(capacity: usize) -> Settings {
    Settings {
        capacity,
        auto_advance: false,
        ..Settings::default()
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("session_flow").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn tick_pushes_then_composites() {
    let mut s = TemporalSession::new(dims(), settings(3), playlist()).unwrap();

    let out = s.tick(&Frame::filled(dims(), 10), Duration::ZERO).unwrap();
    assert!(out.data().iter().all(|&v| v == 10));

    s.tick(&Frame::filled(dims(), 20), Duration::ZERO).unwrap();
    let out = s.tick(&Frame::filled(dims(), 30), Duration::ZERO).unwrap();
    // Mask 0 selects full depth: the oldest frame.
    assert!(out.data().iter().all(|&v| v == 10));

    let out = s.tick(&Frame::filled(dims(), 40), Duration::ZERO).unwrap();
    assert!(out.data().iter().all(|&v| v == 20));
    assert_eq!(s.frames().len(), 3);
}

#[test]
fn next_mask_switches_to_current_view() {
    let mut s = TemporalSession::new(dims(), settings(4), playlist()).unwrap();
    for v in [10, 20, 30, 40] {
        s.tick(&Frame::filled(dims(), v), Duration::ZERO).unwrap();
    }
    assert_eq!(
        s.handle(Command::NextMask, Duration::ZERO).unwrap(),
        SessionEvent::MaskChanged
    );
    assert_eq!(s.playlist().current_label(), "current");

    let out = s.tick(&Frame::filled(dims(), 50), Duration::ZERO).unwrap();
    // Newest pair (50, 40) with weight 3/256 on the older frame.
    assert!(out.data().iter().all(|&v| v == 50));
}

#[test]
fn auto_advance_waits_for_the_full_duration() {
    let cfg = Settings {
        capacity: 2,
        auto_advance: true,
        duration_ms: 5_000,
        ..Settings::default()
    };
    let mut s = TemporalSession::new(dims(), cfg, playlist()).unwrap();
    let f = Frame::filled(dims(), 1);

    s.tick(&f, Duration::from_millis(5_000)).unwrap();
    assert_eq!(s.playlist().index(), 0);

    s.tick(&f, Duration::from_millis(5_001)).unwrap();
    assert_eq!(s.playlist().index(), 1);

    s.tick(&f, Duration::from_millis(9_000)).unwrap();
    assert_eq!(s.playlist().index(), 1);

    s.tick(&f, Duration::from_millis(10_002)).unwrap();
    assert_eq!(s.playlist().index(), 0);
}

#[test]
fn mismatched_frame_is_rejected_without_touching_history() {
    let mut s = TemporalSession::new(dims(), settings(2), playlist()).unwrap();
    s.tick(&Frame::filled(dims(), 5), Duration::ZERO).unwrap();
    let wrong = Frame::filled(FrameDims::rgb(W + 1, H).unwrap(), 9);
    let err = s.tick(&wrong, Duration::ZERO).unwrap_err();
    assert!(err.is_geometry_mismatch());
    assert_eq!(s.frames().len(), 1);
    assert!(s.output().data().iter().all(|&v| v == 5));
}

#[test]
fn view_swaps_mask_and_output_and_mirrors() {
    let mut s = TemporalSession::new(dims(), settings(2), playlist()).unwrap();
    let mut frame = Frame::blank(dims());
    frame.data_mut()[..3].copy_from_slice(&[1, 2, 3]);
    s.tick(&frame, Duration::ZERO).unwrap();

    let view = s.view().unwrap();
    assert_eq!(view.main.pixel(0, 0), &[1, 2, 3]);
    let inset = view.inset.expect("inset shown by default");
    assert_eq!(inset.dims().channels, 3);

    s.handle(Command::ToggleMirrored, Duration::ZERO).unwrap();
    let view = s.view().unwrap();
    assert_eq!(view.main.pixel(W - 1, 0), &[1, 2, 3]);

    s.handle(Command::ToggleMask, Duration::ZERO).unwrap();
    s.handle(Command::ToggleInset, Duration::ZERO).unwrap();
    let view = s.view().unwrap();
    assert!(view.main.data().iter().all(|&v| v == 0));
    assert!(view.inset.is_none());
}

#[test]
fn settings_changes_persist_and_reload() {
    let dir = scratch_dir("persist");
    let path = dir.join("settings.json");
    let _ = std::fs::remove_file(&path);

    let mut s = TemporalSession::new(dims(), settings(2), playlist())
        .unwrap()
        .with_settings_path(&path);
    assert_eq!(
        s.handle(Command::IncDuration, Duration::ZERO).unwrap(),
        SessionEvent::SettingsChanged
    );
    let saved = Settings::load(&path).unwrap();
    assert_eq!(saved.duration_ms, 32_500);

    let edited = Settings {
        compositor: CompositorKind::Banded,
        capacity: 5,
        ..saved
    };
    edited.save(&path).unwrap();
    assert_eq!(
        s.handle(Command::LoadSettings, Duration::ZERO).unwrap(),
        SessionEvent::SettingsReloaded
    );
    assert_eq!(s.settings().compositor, CompositorKind::Banded);
    assert_eq!(s.frames().capacity(), 5);
}

#[test]
fn remote_messages_drive_commands() {
    let mut s = TemporalSession::new(dims(), settings(2), playlist()).unwrap();
    assert_eq!(
        s.handle_message("toggleHud", Duration::ZERO).unwrap(),
        SessionEvent::SettingsChanged
    );
    assert!(!s.settings().show_hud);
    assert_eq!(
        s.handle_message("saveFrame", Duration::ZERO).unwrap(),
        SessionEvent::SaveFrameRequested
    );
    assert_eq!(s.messages().count(), 2);
}

fn persisted_session(path: &std::path::Path) -> TemporalSession {
    let cfg = Settings {
        compositor: CompositorKind::Banded,
        duration_ms: 10_000,
        ..settings(4)
    };
    cfg.save(path).unwrap();
    let mut s = TemporalSession::new(dims(), cfg, playlist())
        .unwrap()
        .with_settings_path(path);
    for v in [10, 20, 30, 40] {
        s.tick(&Frame::filled(dims(), v), Duration::ZERO).unwrap();
    }
    s
}

#[test]
fn corrupt_settings_file_leaves_session_untouched() {
    let dir = scratch_dir("corrupt");
    let path = dir.join("settings.json");
    let mut s = persisted_session(&path);

    std::fs::write(&path, "{ not json").unwrap();
    let err = s.handle(Command::LoadSettings, Duration::ZERO).unwrap_err();
    assert!(matches!(err, timemask::TimemaskError::Serde(_)), "{err}");

    assert_eq!(s.frames().capacity(), 4);
    assert_eq!(s.frames().len(), 4);
    assert_eq!(s.settings().compositor, CompositorKind::Banded);
    assert_eq!(s.settings().duration_ms, 10_000);
    assert!(s.hud_lines(0.0).iter().any(|l| l.ends_with("banded")));
}

#[test]
fn failed_mask_reload_is_all_or_nothing() {
    let dir = scratch_dir("missing_mask");
    let path = dir.join("settings.json");
    let mask_path = dir.join("late.png");
    let _ = std::fs::remove_file(&mask_path);
    let mut s = persisted_session(&path);

    let edited = Settings {
        capacity: 6,
        compositor: CompositorKind::Interpolated,
        masks: vec![mask_path.clone()],
        ..s.settings().clone()
    };
    edited.save(&path).unwrap();
    assert!(s.handle(Command::LoadSettings, Duration::ZERO).is_err());

    assert_eq!(s.frames().capacity(), 4);
    assert_eq!(s.frames().len(), 4);
    assert_eq!(s.settings().compositor, CompositorKind::Banded);
    assert!(s.settings().masks.is_empty());
    assert_eq!(s.playlist().current_label(), "historical");
    assert_eq!(s.mask().get(0, 0), 0);

    // Once the file exists the same reload goes through.
    image::GrayImage::from_pixel(W, H, image::Luma([200]))
        .save(&mask_path)
        .unwrap();
    assert_eq!(
        s.handle(Command::LoadSettings, Duration::ZERO).unwrap(),
        SessionEvent::SettingsReloaded
    );
    assert_eq!(s.frames().capacity(), 6);
    assert_eq!(s.settings().compositor, CompositorKind::Interpolated);
    assert!(s.playlist().current_label().ends_with("late.png"));
    assert_eq!(s.mask().get(0, 0), 200);
}

#[test]
fn dropped_mask_file_replaces_mask_and_restarts_dwell() {
    let dir = scratch_dir("dropped");
    let mask_path = dir.join("dropped.png");
    image::GrayImage::from_pixel(W * 2, H * 2, image::Luma([90]))
        .save(&mask_path)
        .unwrap();

    let cfg = Settings {
        capacity: 2,
        auto_advance: true,
        duration_ms: 5_000,
        ..Settings::default()
    };
    let mut s = TemporalSession::new(dims(), cfg, playlist()).unwrap();
    s.load_mask_path(&mask_path, Duration::from_millis(4_000))
        .unwrap();
    assert_eq!((s.mask().width(), s.mask().height()), (W, H));
    assert!(s.mask().data().iter().all(|&v| v == 90));
    assert_eq!(s.playlist().index(), 0);

    let f = Frame::filled(dims(), 1);
    s.tick(&f, Duration::from_millis(6_000)).unwrap();
    assert_eq!(s.playlist().index(), 0);
    assert!(s.mask().data().iter().all(|&v| v == 90));
    s.tick(&f, Duration::from_millis(9_001)).unwrap();
    assert_eq!(s.playlist().index(), 1);

    let err = s
        .load_mask_path(&dir.join("notes.txt"), Duration::from_millis(9_500))
        .unwrap_err();
    assert!(err.to_string().contains("unsupported mask file"));
    assert!(s.mask().data().iter().all(|&v| v == 255));
}

#[test]
fn rejected_frame_does_not_advance_the_playlist() {
    let cfg = Settings {
        capacity: 2,
        auto_advance: true,
        duration_ms: 5_000,
        ..Settings::default()
    };
    let mut s = TemporalSession::new(dims(), cfg, playlist()).unwrap();
    let wrong = Frame::filled(FrameDims::rgb(W, H + 1).unwrap(), 9);
    let err = s.tick(&wrong, Duration::from_millis(6_000)).unwrap_err();
    assert!(err.is_geometry_mismatch());
    assert_eq!(s.playlist().index(), 0);
    assert!(s.frames().is_empty());
}
