use assert_cmd::Command;
use std::path::Path;

pub fn tutor_cmd() -> Command {
    let mut cmd = Command::cargo_bin("tutor").unwrap();
    cmd.env_remove("GROQ_API_KEY");
    cmd.env_remove("YOUTUBE_API_KEY");
    cmd.env_remove("TUTOR_STORAGE_DIR");
    cmd.env_remove("TUTOR_HEADLESS");
    cmd.env_remove("TUTOR_TELEMETRY_OPTOUT");
    cmd
}

/// Drop a fake executable into `dir` so PATH probing finds it.
#[cfg(unix)]
#[allow(dead_code)]
pub fn fake_tool(dir: &Path, name: &str) {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
