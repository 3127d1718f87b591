//! Check system capabilities.

use gestureflow_common::config::AppConfig;

#[cfg(target_os = "linux")]
pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    use gestureflow_platform_core::DisplayServer;
    use gestureflow_platform_linux::{detect_display_server, permissions};

    println!("GestureFlow System Check");
    println!("{}", "=".repeat(50));

    match detect_display_server() {
        DisplayServer::Wayland => println!("[OK] Display server: Wayland"),
        DisplayServer::X11 => println!("[OK] Display server: X11"),
        _ => println!("[WARN] Display server: Unknown"),
    }

    match gestureflow_platform_linux::detect_monitors() {
        Ok(monitors) => {
            println!("[OK] Monitors detected: {}", monitors.len());
            for m in &monitors {
                println!(
                    "     {} {}x{} at +{}+{} {}",
                    m.name,
                    m.width,
                    m.height,
                    m.x,
                    m.y,
                    if m.primary { "(primary)" } else { "" }
                );
            }
        }
        Err(e) => println!("[WARN] Monitor detection failed: {e}"),
    }
    let display = gestureflow_dispatcher::resolve_display(&config.display);
    println!("     Pointer display: {}x{}", display.width, display.height);

    let helper = config.dispatcher.helper.as_ref().map(|c| c.program.as_str());
    let script = config.dispatcher.script.as_ref().map(|c| c.program.as_str());
    let capabilities = permissions::check_capabilities(helper, script);
    println!();
    permissions::print_capability_report(&capabilities);

    let uinput_ok = capabilities
        .iter()
        .any(|c| c.name == "uinput Access" && c.available);
    let presentation_ok = capabilities.iter().any(|c| {
        (c.name == "Helper Process" || c.name == "Automation Interpreter") && c.available
    });

    println!();
    if !config.dispatcher.native_enabled {
        println!("Native tier disabled in configuration.");
    } else if !uinput_ok {
        println!("Pointer and zoom will use the helper or script tier.");
    }
    if presentation_ok {
        println!("Presentation control has a backend. GestureFlow is ready.");
    } else {
        println!("No presentation backend is available. Configure a helper or script program.");
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("GestureFlow System Check");
    println!("{}", "=".repeat(50));
    let display = gestureflow_dispatcher::resolve_display(&config.display);
    println!("Pointer display: {}x{}", display.width, display.height);
    println!(
        "Helper: {}",
        config
            .dispatcher
            .helper
            .as_ref()
            .map_or("not configured", |c| c.program.as_str())
    );
    println!(
        "Script: {}",
        config
            .dispatcher
            .script
            .as_ref()
            .map_or("not configured", |c| c.program.as_str())
    );
    Ok(())
}
