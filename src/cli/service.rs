//! System service installation (systemd on Linux, launchd on macOS).

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};

/// systemd unit name
pub const SYSTEMD_UNIT: &str = "shell-assistant.service";

/// launchd job label
pub const LAUNCHD_LABEL: &str = "com.shell-assistant.daemon";

/// Where the daemon's launchd logs go
const LAUNCHD_LOG: &str = "/tmp/shell-assistant-daemon.log";

/// Service manager for the current platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Systemd,
    Launchd,
}

impl Platform {
    pub fn current() -> Option<Self> {
        if cfg!(target_os = "linux") {
            Some(Platform::Systemd)
        } else if cfg!(target_os = "macos") {
            Some(Platform::Launchd)
        } else {
            None
        }
    }

    /// Where the service definition is installed
    pub fn target_path(&self) -> Result<PathBuf> {
        match self {
            Platform::Systemd => Ok(PathBuf::from("/etc/systemd/system").join(SYSTEMD_UNIT)),
            Platform::Launchd => Ok(dirs::home_dir()
                .context("Failed to determine home directory")?
                .join("Library/LaunchAgents")
                .join(format!("{}.plist", LAUNCHD_LABEL))),
        }
    }

    /// Service definition text pointing at `binary`
    pub fn render(&self, binary: &Path) -> String {
        match self {
            Platform::Systemd => render_systemd_unit(binary),
            Platform::Launchd => render_launchd_plist(binary),
        }
    }
}

/// Render a systemd unit that runs `<binary> start`
pub fn render_systemd_unit(binary: &Path) -> String {
    format!(
        "[Unit]
Description=Shell Assistant Daemon - LLM-powered command generation
After=network-online.target
Wants=network-online.target

[Service]
Type=simple
ExecStart={} start
Restart=on-failure
RestartSec=5
Environment=RUST_LOG=info

[Install]
WantedBy=multi-user.target
",
        binary.display()
    )
}

/// Render a launchd plist that runs `<binary> start` at login
pub fn render_launchd_plist(binary: &Path) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{label}</string>
    <key>ProgramArguments</key>
    <array>
        <string>{binary}</string>
        <string>start</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
    <key>KeepAlive</key>
    <true/>
    <key>StandardOutPath</key>
    <string>{log}</string>
    <key>StandardErrorPath</key>
    <string>{log}</string>
</dict>
</plist>
"#,
        label = LAUNCHD_LABEL,
        binary = binary.display(),
        log = LAUNCHD_LOG,
    )
}

fn current_platform() -> Result<Platform> {
    Platform::current().with_context(|| {
        format!(
            "Unsupported platform: {}. Service installation is only supported on Linux and macOS",
            std::env::consts::OS
        )
    })
}

/// Install the service definition for the running binary
pub fn install() -> Result<()> {
    let platform = current_platform()?;
    let binary = std::env::current_exe().context("Failed to locate current executable")?;
    let target = platform.target_path()?;

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    std::fs::write(&target, platform.render(&binary)).with_context(|| {
        format!(
            "Failed to write {} (root privileges may be required: sudo shell-assistant install-service)",
            target.display()
        )
    })?;
    println!("✅ Installed service definition to {}", target.display());

    match platform {
        Platform::Systemd => {
            run_quiet("systemctl", &["daemon-reload"])?;
            println!("✅ Reloaded systemd");
            println!("\n📋 Next steps:");
            println!("   1. Enable service: sudo systemctl enable shell-assistant");
            println!("   2. Start service: sudo systemctl start shell-assistant");
            println!("   3. Check status: sudo systemctl status shell-assistant");
        }
        Platform::Launchd => {
            println!("\n📋 Next steps:");
            println!("   1. Load service: launchctl load {}", target.display());
            println!("   2. Check status: launchctl list | grep shell-assistant");
            println!("   3. View logs: tail -f {}", LAUNCHD_LOG);
        }
    }

    Ok(())
}

/// Stop the service and remove its definition
pub fn uninstall() -> Result<()> {
    let platform = current_platform()?;
    let target = platform.target_path()?;

    if !target.exists() {
        println!("⚠️  Service definition not found at {}", target.display());
        return Ok(());
    }

    match platform {
        Platform::Systemd => {
            // Failures here only mean the unit was not running or enabled
            let _ = run_quiet("systemctl", &["stop", "shell-assistant"]);
            let _ = run_quiet("systemctl", &["disable", "shell-assistant"]);
        }
        Platform::Launchd => {
            let target_str = target.to_string_lossy().to_string();
            let _ = run_quiet("launchctl", &["unload", &target_str]);
        }
    }

    std::fs::remove_file(&target)
        .with_context(|| format!("Failed to remove {}", target.display()))?;
    println!("✅ Removed service definition from {}", target.display());

    if platform == Platform::Systemd {
        run_quiet("systemctl", &["daemon-reload"])?;
        println!("✅ Reloaded systemd");
    }

    Ok(())
}

/// Run a service-manager command, failing on non-zero exit
fn run_quiet(program: &str, args: &[&str]) -> Result<()> {
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("Failed to run {}", program))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(
            "{} {} failed: {}",
            program,
            args.join(" "),
            stderr.trim()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_systemd_unit_runs_start() {
        let unit = render_systemd_unit(Path::new("/usr/local/bin/shell-assistant"));
        assert!(unit.contains("ExecStart=/usr/local/bin/shell-assistant start"));
        assert!(unit.contains("[Install]"));
    }

    #[test]
    fn test_launchd_plist_has_label_and_binary() {
        let plist = render_launchd_plist(Path::new("/opt/bin/shell-assistant"));
        assert!(plist.contains("<string>com.shell-assistant.daemon</string>"));
        assert!(plist.contains("<string>/opt/bin/shell-assistant</string>"));
        assert!(plist.contains(LAUNCHD_LOG));
    }

    #[test]
    fn test_systemd_target_path() {
        assert_eq!(
            Platform::Systemd.target_path().unwrap(),
            PathBuf::from("/etc/systemd/system/shell-assistant.service")
        );
    }
}
