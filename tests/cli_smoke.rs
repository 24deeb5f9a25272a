use std::path::PathBuf;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_timemask")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "timemask.exe"
            } else {
                "timemask"
            });
            p
        })
}

#[test]
fn cli_render_writes_one_png_per_frame() {
    let dir = PathBuf::from("target").join("cli_smoke");
    let frames_dir = dir.join("frames");
    let out_dir = dir.join("out");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&frames_dir).unwrap();

    for i in 0..4u8 {
        let img = image::RgbImage::from_pixel(8, 6, image::Rgb([i * 60, 10, 200 - i * 40]));
        img.save(frames_dir.join(format!("in_{i:03}.png"))).unwrap();
    }

    let frames_arg = frames_dir.to_string_lossy().to_string();
    let out_arg = out_dir.to_string_lossy().to_string();
    let status = std::process::Command::new(exe())
        .args([
            "render",
            "--frames",
            frames_arg.as_str(),
            "--out",
            out_arg.as_str(),
            "--pattern",
            "radial",
            "--capacity",
            "3",
        ])
        .status()
        .unwrap();
    assert!(status.success());

    for i in 0..4 {
        let path = out_dir.join(format!("frame_{i:05}.png"));
        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (8, 6));
    }
    // First tick has a single frame in history, so the output is that frame.
    let first = image::open(out_dir.join("frame_00000.png")).unwrap().to_rgb8();
    assert!(first.pixels().all(|p| p.0 == [0, 10, 200]));
}

#[test]
fn cli_init_settings_writes_defaults() {
    let dir = PathBuf::from("target").join("cli_smoke_settings");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("settings.json");
    let _ = std::fs::remove_file(&path);

    let path_arg = path.to_string_lossy().to_string();
    let status = std::process::Command::new(exe())
        .args(["init-settings", "--out", path_arg.as_str()])
        .status()
        .unwrap();
    assert!(status.success());

    let loaded = timemask::Settings::load(&path).unwrap();
    assert_eq!(loaded, timemask::Settings::default());
}
