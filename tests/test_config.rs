use std::sync::Mutex;

use wireline::config::Config;

// Environment variables are process-global; serialize the tests that touch them.
static ENV_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn test_config_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        std::env::remove_var("WIRELINE_CONFIG");
        std::env::remove_var("PORT");
    }

    let cfg = Config::load().unwrap();

    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.upstream, "http://httpbin.org");
    assert_eq!(cfg.video_path, "assets/sample.mp4");
}

#[test]
fn test_config_port_override_from_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        std::env::remove_var("WIRELINE_CONFIG");
        std::env::set_var("PORT", "3000");
    }

    let cfg = Config::load().unwrap();

    assert_eq!(cfg.port, 3000);

    unsafe {
        std::env::remove_var("PORT");
    }
}

#[test]
fn test_config_from_yaml_file() {
    let _guard = ENV_LOCK.lock().unwrap();
    let path = std::env::temp_dir().join(format!("wireline-test-{}.yaml", std::process::id()));
    std::fs::write(
        &path,
        "port: 9090\nupstream: http://127.0.0.1:1234\nvideo_path: /tmp/clip.mp4\n",
    )
    .unwrap();
    unsafe {
        std::env::remove_var("PORT");
        std::env::set_var("WIRELINE_CONFIG", &path);
    }

    let cfg = Config::load().unwrap();

    assert_eq!(cfg.port, 9090);
    assert_eq!(cfg.upstream, "http://127.0.0.1:1234");
    assert_eq!(cfg.video_path, "/tmp/clip.mp4");

    unsafe {
        std::env::remove_var("WIRELINE_CONFIG");
    }
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_config_partial_yaml_uses_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    let path = std::env::temp_dir().join(format!("wireline-partial-{}.yaml", std::process::id()));
    std::fs::write(&path, "port: 9091\n").unwrap();
    unsafe {
        std::env::remove_var("PORT");
        std::env::set_var("WIRELINE_CONFIG", &path);
    }

    let cfg = Config::load().unwrap();

    assert_eq!(cfg.port, 9091);
    assert_eq!(cfg.upstream, "http://httpbin.org");

    unsafe {
        std::env::remove_var("WIRELINE_CONFIG");
    }
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_config_invalid_port_is_an_error() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        std::env::remove_var("WIRELINE_CONFIG");
        std::env::set_var("PORT", "not-a-port");
    }

    let result = Config::load();

    assert!(result.is_err());

    unsafe {
        std::env::remove_var("PORT");
    }
}
