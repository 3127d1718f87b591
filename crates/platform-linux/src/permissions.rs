//! Capability detection and guidance for Linux.
//!
//! Each executor tier depends on something outside the process: a writable
//! uinput node, a helper interpreter, or an automation interpreter.

/// A system capability that GestureFlow may need.
#[derive(Debug, Clone)]
pub struct Capability {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub required: bool,
    pub fix_instructions: Option<String>,
}

/// Check platform capabilities plus the configured external programs.
///
/// `helper_program` and `script_program` are `None` when the tier is
/// disabled in configuration.
pub fn check_capabilities(
    helper_program: Option<&str>,
    script_program: Option<&str>,
) -> Vec<Capability> {
    let mut caps = vec![check_display_session(), check_uinput_access()];
    if let Some(program) = helper_program {
        caps.push(check_program(
            "Helper Process",
            "Persistent helper for presentation control (tier 2)",
            program,
        ));
    }
    if let Some(program) = script_program {
        caps.push(check_program(
            "Automation Interpreter",
            "One-shot automation fallback (tier 3)",
            program,
        ));
    }
    caps
}

fn check_display_session() -> Capability {
    let available = std::env::var("WAYLAND_DISPLAY").is_ok() || std::env::var("DISPLAY").is_ok();

    Capability {
        name: "Display Session".to_string(),
        description: "Graphical session receiving cursor and zoom input".to_string(),
        available,
        required: true,
        fix_instructions: if available {
            None
        } else {
            Some("Run inside a graphical desktop session (GNOME, KDE, etc.)".to_string())
        },
    }
}

fn check_uinput_access() -> Capability {
    let available = crate::uinput::UinputInjector::is_supported();

    Capability {
        name: "uinput Access".to_string(),
        description: "Native cursor and wheel injection (tier 1)".to_string(),
        available,
        required: false,
        fix_instructions: if available {
            None
        } else {
            Some(crate::uinput::uinput_diagnostic())
        },
    }
}

fn check_program(name: &str, description: &str, program: &str) -> Capability {
    let available = find_in_path(program).is_some();

    Capability {
        name: name.to_string(),
        description: description.to_string(),
        available,
        required: false,
        fix_instructions: if available {
            None
        } else {
            Some(format!("Install `{program}` or point the config at an existing binary"))
        },
    }
}

/// Resolve a program name the way a shell would.
pub fn find_in_path(program: &str) -> Option<std::path::PathBuf> {
    let candidate = std::path::Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|full| full.is_file())
}

/// Print a user-friendly capability report.
pub fn print_capability_report(capabilities: &[Capability]) {
    println!("GestureFlow Capabilities:");
    println!("{}", "-".repeat(60));

    for cap in capabilities {
        let status = if cap.available {
            "[OK]"
        } else if cap.required {
            "[MISSING - REQUIRED]"
        } else {
            "[MISSING - OPTIONAL]"
        };

        println!("  {} {}: {}", status, cap.name, cap.description);

        if let Some(ref fix) = cap.fix_instructions {
            println!("    Fix: {fix}");
        }
    }
}
