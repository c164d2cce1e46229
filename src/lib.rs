use tauri::Manager;

mod commands;
mod logging;
mod presenter;
mod settings;
mod state;
mod types;
mod workspace;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    if let Err(e) = logging::init() {
        eprintln!("{}", e);
    }

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            let portal = state::PortalState::build(app.handle())?;
            app.manage(portal);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::list_processes,
            commands::show_home,
            commands::show_process,
            commands::current_view,
            commands::get_settings,
            commands::pick_file,
            commands::clear_file,
            commands::submit_form,
            commands::reveal_artifact
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
