use std::path::{Path, PathBuf};

use eframe::egui::{self, Color32, RichText};
use grading_common::{CategoryScope, GradingItem, Judgment, Phase, Score};

use crate::io::{default_updated_path, export_session, open_session};
use crate::model::{AppState, FormState};
use tracing::{info, warn};

#[derive(Default)]
pub struct DesktopApp {
    state: AppState,
    status: String,
}

impl DesktopApp {
    fn open_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV", &["csv"])
            .pick_file()
        {
            self.load_from_path(&path);
        }
    }

    pub fn load_from_path(&mut self, path: &Path) {
        match open_session(path, self.state.scope) {
            Ok(session) => {
                info!(
                    path = %path.display(),
                    queued = session.queue().total(),
                    scope = %self.state.scope,
                    "grading file opened"
                );
                self.status = format!(
                    "Loaded {} ({} rows to grade)",
                    path.display(),
                    session.queue().total()
                );
                self.state.session = Some(session);
                self.state.source_path = Some(path.to_path_buf());
                self.state.form = FormState::default();
                self.state.last_export = None;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %format!("{err:#}"), "failed to open grading file");
                self.status = format!("Load failed: {err:#}");
            }
        }
    }

    fn export(&mut self) {
        let Some(source) = &self.state.source_path else {
            self.status = "No source file loaded".to_string();
            return;
        };
        let default_path = default_updated_path(source);
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV", &["csv"])
            .set_file_name(
                default_path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or("grading_data_UPDATED.csv"),
            )
            .save_file()
        else {
            return;
        };
        self.export_to(path);
    }

    pub fn export_to(&mut self, path: PathBuf) {
        let Some(session) = &self.state.session else {
            self.status = "No source file loaded".to_string();
            return;
        };
        match export_session(session, &path) {
            Ok(_) => {
                info!(path = %path.display(), graded = session.stats().graded, "grading file saved");
                self.status = format!("Saved {}", path.display());
                self.state.last_export = Some(path);
            }
            Err(err) => {
                warn!(path = %path.display(), error = %format!("{err:#}"), "failed to save grading file");
                self.status = format!("Save failed: {err:#}");
            }
        }
    }

    fn render_item(ui: &mut egui::Ui, item: &GradingItem) {
        ui.label(RichText::new("Prompt").strong());
        ui.label(item.prompt.as_str());
        ui.add_space(6.0);
        ui.label(RichText::new("Question").strong());
        ui.label(item.question.as_str());
        ui.add_space(6.0);
        ui.label(RichText::new("Student Answer").strong());
        egui::Frame::none()
            .fill(Color32::from_rgb(24, 36, 56))
            .rounding(egui::Rounding::same(6.0))
            .inner_margin(egui::Margin::same(8.0))
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.label(item.students_answer.as_str());
            });
    }

    fn render_input(&mut self, ui: &mut egui::Ui) {
        let Some(session) = &self.state.session else {
            return;
        };
        let options = session.category_options();
        let form = &mut self.state.form;

        egui::ComboBox::from_label("Select Score (1–10)")
            .selected_text(form.score.to_string())
            .show_ui(ui, |ui| {
                for score in Score::all() {
                    ui.selectable_value(&mut form.score, score, score.to_string());
                }
            });

        ui.add_space(6.0);
        ui.label(RichText::new("Select Categories").strong());
        if options.is_empty() {
            ui.label("(no categories available for this row)");
        }
        ui.horizontal_wrapped(|ui| {
            for option in &options {
                let mut checked = form.selected.contains(option);
                if ui.checkbox(&mut checked, option.as_str()).changed() {
                    if checked {
                        form.selected.insert(option.clone());
                    } else {
                        form.selected.remove(option);
                    }
                }
            }
        });

        ui.add_space(10.0);
        if ui.button("Submit").clicked() {
            let score = form.score;
            let selected = form.selected_in_order(&options);
            if let Some(session) = self.state.session.as_mut() {
                if let Err(err) = session.submit(score, selected) {
                    self.status = format!("Submit failed: {err}");
                }
            }
        }
    }

    fn render_finalization(&mut self, ui: &mut egui::Ui) {
        let Some(session) = &self.state.session else {
            return;
        };
        let agrees = session.missing_from_grader().is_empty();
        let revealed = session.revealed_model_categories();
        let form = &mut self.state.form;

        let mut reveal_clicked = false;
        if agrees {
            ui.colored_label(Color32::from_rgb(120, 200, 120), "Your categories match the model.");
        } else {
            ui.colored_label(
                Color32::from_rgb(246, 196, 69),
                "The model selected categories you did not.",
            );
            match &revealed {
                Some(model) => {
                    ui.label(format!("Model Categories: {}", model.join(", ")));
                }
                None => {
                    reveal_clicked = ui.button("Reveal model categories").clicked();
                }
            }

            ui.add_space(6.0);
            ui.label("Are the model's extra categories acceptable?");
            ui.horizontal(|ui| {
                ui.radio_value(&mut form.judgment, Some(Judgment::Acceptable), "Yes");
                ui.radio_value(&mut form.judgment, Some(Judgment::NotAcceptable), "No");
            });
            ui.label("Optional note about disagreement");
            ui.text_edit_multiline(&mut form.comment);
        }

        ui.add_space(10.0);
        let can_finalize = agrees || form.judgment.is_some();
        let finalize_clicked = ui
            .add_enabled(can_finalize, egui::Button::new("Save and Next"))
            .clicked();
        let judgment = form.judgment;
        let comment = form.comment.trim().to_string();

        let Some(session) = self.state.session.as_mut() else {
            return;
        };
        if reveal_clicked {
            if let Err(err) = session.reveal() {
                self.status = format!("Reveal failed: {err}");
            }
        }
        if finalize_clicked {
            match session.finalize(judgment, &comment) {
                Ok(record) => {
                    self.status = format!("Saved row #{}", record.row_id);
                    self.state.form = FormState::default();
                }
                Err(err) => self.status = format!("Save failed: {err}"),
            }
        }
    }

    fn render_done(&mut self, ui: &mut egui::Ui) {
        let Some(session) = &self.state.session else {
            return;
        };
        let stats = session.stats();
        ui.heading("🎉 All items graded!");
        ui.label(format!(
            "Graded {} rows: {} matched, {} accepted, {} rejected",
            stats.graded, stats.agreed, stats.accepted, stats.rejected
        ));
        if let Some(path) = &self.state.last_export {
            ui.label(format!("Last saved: {}", path.display()));
        }
        ui.add_space(10.0);
        if ui.button("Save file").clicked() {
            self.export();
        }
    }
}

impl eframe::App for DesktopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open CSV").clicked() {
                        self.open_csv();
                        ui.close_menu();
                    }
                    let save_enabled = self.state.session.is_some();
                    if ui.add_enabled(save_enabled, egui::Button::new("Save file")).clicked() {
                        self.export();
                        ui.close_menu();
                    }
                });

                ui.menu_button("Categories", |ui| {
                    ui.label("Applies to the next opened file");
                    ui.radio_value(&mut self.state.scope, CategoryScope::Row, "This row only");
                    ui.radio_value(&mut self.state.scope, CategoryScope::Dataset, "Whole dataset");
                });

                ui.separator();
                if !self.status.is_empty() {
                    ui.label(RichText::new(&self.status).color(Color32::from_gray(170)));
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Grading Interface");
            let Some(session) = &self.state.session else {
                ui.label("Open a CSV file to start grading.");
                return;
            };

            let queue = session.queue();
            ui.add(
                egui::ProgressBar::new(queue.progress())
                    .text(format!("{}/{}", queue.position(), queue.total())),
            );
            ui.separator();

            let phase = session.phase();
            let item = session.current_item();

            egui::ScrollArea::vertical().show(ui, |ui| {
                if let Some(item) = &item {
                    Self::render_item(ui, item);
                    ui.separator();
                }
                match phase {
                    Phase::AwaitingInput => self.render_input(ui),
                    Phase::AwaitingFinalization => self.render_finalization(ui),
                    Phase::Done => self.render_done(ui),
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    const CSV: &str = "prompt,question,students_answer,categories,grade1_rating,grader1_categories,grader2_categories,model_categories,acceptable\nP,Q,A,X|Y,,,,X,\n";

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture_logs(f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_load_failure_is_logged() {
        let mut app = DesktopApp::default();
        let logs = capture_logs(|| app.load_from_path(Path::new("/nonexistent/grading_data.csv")));

        assert!(app.status.starts_with("Load failed"));
        assert!(app.state.session.is_none());
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("failed to open grading file"), "{logs}");
    }

    #[test]
    fn test_load_and_save_are_logged() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("grading_data.csv");
        std::fs::write(&input, CSV).unwrap();
        let output = default_updated_path(&input);

        let mut app = DesktopApp::default();
        let logs = capture_logs(|| {
            app.load_from_path(&input);
            app.export_to(output.clone());
        });

        assert!(logs.contains("grading file opened"), "{logs}");
        assert!(logs.contains("grading file saved"), "{logs}");
        assert!(output.exists());
        assert_eq!(app.state.last_export.as_deref(), Some(output.as_path()));
    }

    #[test]
    fn test_save_over_input_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("grading_data.csv");
        std::fs::write(&input, CSV).unwrap();

        let mut app = DesktopApp::default();
        app.load_from_path(&input);
        let logs = capture_logs(|| app.export_to(input.clone()));

        assert!(app.status.starts_with("Save failed"));
        assert!(app.state.last_export.is_none());
        assert!(logs.contains("failed to save grading file"), "{logs}");
        assert_eq!(std::fs::read_to_string(&input).unwrap(), CSV);
    }
}
