mod app;
mod io;
mod model;

use app::DesktopApp;

fn main() -> eframe::Result<()> {
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    let initial = std::env::args_os().nth(1).map(std::path::PathBuf::from);
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Grading Interface",
        options,
        Box::new(move |_cc| {
            let mut app = DesktopApp::default();
            if let Some(path) = initial {
                app.load_from_path(&path);
            }
            Box::new(app)
        }),
    )
}
