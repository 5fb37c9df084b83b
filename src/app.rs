//! Desktop UI on top of the deck store.
//! Screens only collect input and render state; every rule lives in the library.

use docard::export::json::{export_json_to_path, import_json};
use docard::images::pick_image_file;
use docard::models::{
    CardPatch, EmptyReason, LastScore, NewCard, ScoreGrade, SessionPhase, StudyMode,
    StudySession, Tally,
};
use docard::store::DeckStore;
use eframe::egui;
use egui::Color32;

/// Application screen states
#[derive(Default, Clone, PartialEq)]
enum AppScreen {
    #[default]
    Home,
    Deck(String),
    EditCard {
        deck_id: String,
        card_id: String,
    },
    Study,
    Results,
}

/// Text fields of the add/edit card forms
#[derive(Default)]
struct CardForm {
    front: String,
    back: String,
    front_image: Option<String>,
    back_image: Option<String>,
}

/// Main application state
pub struct MyApp {
    store: DeckStore,
    show_confirmation_dialog: bool,
    allowed_to_close: bool,

    current_screen: AppScreen,
    new_deck_title: String,
    deck_query: String,
    card_query: String,
    new_card: CardForm,
    edit_card: CardForm,

    session: Option<StudySession>,
    last_tally: Option<Tally>,

    show_export_dialog: bool,
    confirm_delete_deck: Option<String>,
    notice: Option<String>,
}

fn grade_badge(score: Option<&LastScore>) -> (String, Color32) {
    let text = score
        .map(|s| format!("{}%", s.pct))
        .unwrap_or_else(|| "New".to_string());
    let color = match ScoreGrade::from_score(score) {
        ScoreGrade::New => Color32::GRAY,
        ScoreGrade::Good => Color32::from_rgb(67, 160, 71),
        ScoreGrade::Fair => Color32::from_rgb(255, 152, 0),
        ScoreGrade::Poor => Color32::from_rgb(229, 57, 53),
    };
    (text, color)
}

/// Runs the image picker and stores a successful pick in `slot`.
fn pick_into(slot: &mut Option<String>, notice: &mut Option<String>) {
    if let Some(message) = pick_image_file().apply_to(slot) {
        *notice = Some(message);
    }
}

fn image_row(
    ui: &mut egui::Ui,
    label: &str,
    slot: &mut Option<String>,
    notice: &mut Option<String>,
) {
    ui.horizontal(|ui| {
        ui.label(label);
        match slot.as_deref() {
            Some(uri) => ui.label(uri),
            None => ui.weak("No image"),
        };
        if ui.button("Choose…").clicked() {
            pick_into(slot, notice);
        }
        if slot.is_some() && ui.button("Remove").clicked() {
            *slot = None;
        }
    });
}

impl eframe::App for MyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match self.current_screen.clone() {
            AppScreen::Home => self.render_home_screen(ctx),
            AppScreen::Deck(deck_id) => self.render_deck_screen(ctx, &deck_id),
            AppScreen::EditCard { deck_id, card_id } => {
                self.render_edit_screen(ctx, &deck_id, &card_id)
            }
            AppScreen::Study => self.render_study_screen(ctx),
            AppScreen::Results => self.render_results_screen(ctx),
        }

        // Handle window close requests with confirmation dialog
        if ctx.input(|i| i.viewport().close_requested()) && !self.allowed_to_close {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.show_confirmation_dialog = true;
        }

        if self.show_confirmation_dialog {
            egui::Window::new("Do you want to quit?")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("No").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = false;
                        }

                        if ui.button("Yes").clicked() {
                            self.store.flush();
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = true;
                            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                });
        }

        if self.show_export_dialog {
            let mut export_deck_id: Option<String> = None;
            let mut should_cancel = false;

            egui::Window::new("Export Deck")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label("Select a deck to export:");
                    ui.separator();

                    for deck in self.store.decks() {
                        if ui
                            .button(format!("{} ({} cards)", deck.title, deck.cards.len()))
                            .clicked()
                        {
                            export_deck_id = Some(deck.id.clone());
                        }
                    }

                    ui.separator();

                    if ui.button("Cancel").clicked() {
                        should_cancel = true;
                    }
                });

            if let Some(id) = export_deck_id {
                self.handle_export(&id);
            }
            if should_cancel {
                self.show_export_dialog = false;
            }
        }

        if let Some(deck_id) = self.confirm_delete_deck.clone() {
            let title = self
                .store
                .deck(&deck_id)
                .map(|d| d.title.clone())
                .unwrap_or_default();
            let mut confirmed = false;
            let mut cancelled = false;

            egui::Window::new("Delete deck?")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(format!("This will delete \"{}\" and all its cards.", title));
                    ui.horizontal(|ui| {
                        if ui.button("Cancel").clicked() {
                            cancelled = true;
                        }
                        if ui.button("Delete").clicked() {
                            confirmed = true;
                        }
                    });
                });

            if confirmed {
                self.store.remove_deck(&deck_id);
                self.current_screen = AppScreen::Home;
            }
            if confirmed || cancelled {
                self.confirm_delete_deck = None;
            }
        }

        if let Some(message) = self.notice.clone() {
            egui::Window::new("Notice")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&message);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.notice = None;
                    }
                });
        }
    }
}

impl MyApp {
    pub fn new(store: DeckStore) -> Self {
        Self {
            store,
            show_confirmation_dialog: false,
            allowed_to_close: false,
            current_screen: AppScreen::Home,
            new_deck_title: String::new(),
            deck_query: String::new(),
            card_query: String::new(),
            new_card: CardForm::default(),
            edit_card: CardForm::default(),
            session: None,
            last_tally: None,
            show_export_dialog: false,
            confirm_delete_deck: None,
            notice: None,
        }
    }

    /// Renders the deck list with stats, search and deck creation
    fn render_home_screen(&mut self, ctx: &egui::Context) {
        let mut action_open: Option<String> = None;
        let mut action_study: Option<String> = None;
        let mut action_create = false;
        let mut action_import = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            let stats = self.store.stats();
            ui.heading("My Flashcards");
            ui.label(format!(
                "{} decks • {} cards • average score {}",
                stats.total_decks,
                stats.total_cards,
                stats
                    .average_score
                    .map(|s| format!("{}%", s))
                    .unwrap_or_else(|| "-".to_string())
            ));

            ui.horizontal(|ui| {
                if ui.button("Export Deck").clicked() {
                    self.show_export_dialog = true;
                }
                if ui.button("Import Deck").clicked() {
                    action_import = true;
                }
            });

            ui.separator();

            ui.heading("Create New Deck");
            ui.horizontal(|ui| {
                ui.label("Title:");
                ui.text_edit_singleline(&mut self.new_deck_title);
                if ui.button("Create Deck").clicked() {
                    action_create = true;
                }
            });

            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Search:");
                ui.text_edit_singleline(&mut self.deck_query);
            });

            egui::ScrollArea::vertical()
                .id_source("decks_list")
                .show(ui, |ui| {
                    let decks = self.store.search(&self.deck_query);
                    if decks.is_empty() {
                        ui.label("No decks yet.");
                    }
                    for deck in decks {
                        ui.horizontal(|ui| {
                            if ui
                                .selectable_label(
                                    false,
                                    format!("{} ({} cards)", deck.title, deck.cards.len()),
                                )
                                .clicked()
                            {
                                action_open = Some(deck.id.clone());
                            }

                            let (badge, color) = grade_badge(deck.last_score.as_ref());
                            ui.colored_label(color, badge);

                            if ui.button("Study").clicked() {
                                action_study = Some(deck.id.clone());
                            }
                        });
                    }
                });
        });

        // Execute deferred actions
        if action_create && self.store.add_deck(&self.new_deck_title).is_some() {
            self.new_deck_title.clear();
        }
        if action_import {
            self.handle_import();
        }
        if let Some(id) = action_open {
            self.card_query.clear();
            self.new_card = CardForm::default();
            self.current_screen = AppScreen::Deck(id);
        }
        if let Some(id) = action_study {
            self.start_session(&id, StudyMode::All);
        }
    }

    /// Renders one deck: card creation, card list and deck actions
    fn render_deck_screen(&mut self, ctx: &egui::Context, deck_id: &str) {
        let Some(deck) = self.store.deck(deck_id).cloned() else {
            self.render_missing(ctx, "Deck not found.");
            return;
        };

        let mut action_add = false;
        let mut action_edit: Option<String> = None;
        let mut action_remove: Option<String> = None;
        let mut action_study = false;
        let mut action_back = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(&deck.title);
            ui.label(format!("{} cards", deck.cards.len()));
            if let Some(score) = &deck.last_score {
                ui.label(format!(
                    "Last score: {} / {} ({}%) on {}",
                    score.correct,
                    score.total,
                    score.pct,
                    score.when.format("%Y-%m-%d")
                ));
            }

            ui.horizontal(|ui| {
                if ui.button("Study").clicked() {
                    action_study = true;
                }
                if ui.button("Delete Deck").clicked() {
                    self.confirm_delete_deck = Some(deck.id.clone());
                }
                if ui.button("Back").clicked() {
                    action_back = true;
                }
            });

            ui.separator();

            ui.heading("Add Card");
            ui.horizontal(|ui| {
                ui.label("Front:");
                ui.text_edit_singleline(&mut self.new_card.front);
            });
            ui.horizontal(|ui| {
                ui.label("Back:");
                ui.text_edit_singleline(&mut self.new_card.back);
            });
            image_row(ui, "Front image:", &mut self.new_card.front_image, &mut self.notice);
            image_row(ui, "Back image:", &mut self.new_card.back_image, &mut self.notice);
            if ui.button("Add Card").clicked() {
                action_add = true;
            }

            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Search cards:");
                ui.text_edit_singleline(&mut self.card_query);
            });

            egui::ScrollArea::vertical()
                .id_source("cards_list")
                .show(ui, |ui| {
                    for card in deck.search_cards(&self.card_query) {
                        ui.group(|ui| {
                            ui.label(format!("Q: {}", card.front));
                            ui.label(format!("A: {}", card.back));
                            ui.horizontal(|ui| {
                                if ui.button("Edit").clicked() {
                                    action_edit = Some(card.id.clone());
                                }
                                if ui.button("Delete").clicked() {
                                    action_remove = Some(card.id.clone());
                                }
                            });
                        });
                    }
                });
        });

        // Execute deferred actions
        if action_add {
            let form = &self.new_card;
            let card = NewCard {
                front: form.front.clone(),
                back: form.back.clone(),
                image_front_uri: form.front_image.clone(),
                image_back_uri: form.back_image.clone(),
            };
            if self.store.add_card(deck_id, card).is_some() {
                self.new_card = CardForm::default();
            }
        }
        if let Some(card_id) = action_remove {
            self.store.remove_card(deck_id, &card_id);
        }
        if let Some(card_id) = action_edit {
            if let Some(card) = deck.card(&card_id) {
                self.edit_card = CardForm {
                    front: card.front.clone(),
                    back: card.back.clone(),
                    front_image: card.image_front_uri.clone(),
                    back_image: card.image_back_uri.clone(),
                };
                self.current_screen = AppScreen::EditCard {
                    deck_id: deck_id.to_string(),
                    card_id,
                };
            }
        }
        if action_study {
            self.start_session(deck_id, StudyMode::All);
        }
        if action_back {
            self.current_screen = AppScreen::Home;
        }
    }

    fn render_edit_screen(&mut self, ctx: &egui::Context, deck_id: &str, card_id: &str) {
        if self.store.deck(deck_id).and_then(|d| d.card(card_id)).is_none() {
            self.render_missing(ctx, "Card not found.");
            return;
        }

        let mut action_save = false;
        let mut action_delete = false;
        let mut action_back = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Edit Card");
            ui.horizontal(|ui| {
                ui.label("Front:");
                ui.text_edit_singleline(&mut self.edit_card.front);
            });
            ui.horizontal(|ui| {
                ui.label("Back:");
                ui.text_edit_singleline(&mut self.edit_card.back);
            });
            image_row(ui, "Front image:", &mut self.edit_card.front_image, &mut self.notice);
            image_row(ui, "Back image:", &mut self.edit_card.back_image, &mut self.notice);

            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    action_save = true;
                }
                if ui.button("Delete").clicked() {
                    action_delete = true;
                }
                if ui.button("Cancel").clicked() {
                    action_back = true;
                }
            });
        });

        if action_save {
            let form = &self.edit_card;
            let patch = CardPatch::default()
                .front(form.front.clone())
                .back(form.back.clone())
                .front_image(form.front_image.clone())
                .back_image(form.back_image.clone());
            self.store.update_card(deck_id, card_id, patch);
        }
        if action_delete {
            self.store.remove_card(deck_id, card_id);
        }
        if action_save || action_delete || action_back {
            self.current_screen = AppScreen::Deck(deck_id.to_string());
        }
    }

    /// Renders the study session: one card at a time, flip, then Yes/No
    fn render_study_screen(&mut self, ctx: &egui::Context) {
        let mut action_flip = false;
        let mut action_mark: Option<bool> = None;
        let mut action_back = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(session) = &self.session else {
                ui.label("Deck not found.");
                if ui.button("Go back").clicked() {
                    action_back = true;
                }
                return;
            };

            ui.heading(format!("Study: {}", session.deck_title));

            match session.phase() {
                SessionPhase::Empty(reason) => {
                    ui.label(match reason {
                        EmptyReason::NoCards => "This deck has no cards yet.",
                        EmptyReason::NoWrongCards => "No wrong cards to review.",
                    });
                    if ui.button("Go back").clicked() {
                        action_back = true;
                    }
                }
                SessionPhase::Complete => {
                    ui.label("Session complete.");
                }
                phase @ (SessionPhase::Presenting | SessionPhase::Revealed) => {
                    let Some(card) = session.current_card() else {
                        return;
                    };
                    let revealed = phase == SessionPhase::Revealed;

                    ui.horizontal(|ui| {
                        ui.label(format!("{} / {}", session.position(), session.total_count()));
                        ui.add(
                            egui::ProgressBar::new(f32::from(session.progress_pct()) / 100.0)
                                .show_percentage(),
                        );
                    });

                    ui.add_space(20.0);

                    ui.group(|ui| {
                        ui.set_min_height(200.0);
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            if revealed {
                                ui.heading("Answer");
                                ui.label(&card.back);
                                if let Some(uri) = &card.image_back_uri {
                                    ui.weak(uri);
                                }
                            } else {
                                ui.heading("Question");
                                ui.label(&card.front);
                                if let Some(uri) = &card.image_front_uri {
                                    ui.weak(uri);
                                }
                            }
                            ui.add_space(20.0);
                        });
                    });

                    ui.add_space(20.0);

                    let flip_text = if revealed { "Flip back" } else { "Flip" };
                    if ui.button(flip_text).clicked() {
                        action_flip = true;
                    }

                    if revealed {
                        ui.label("Did you know it?");
                        ui.horizontal(|ui| {
                            if ui.button("No").clicked() {
                                action_mark = Some(false);
                            }
                            if ui.button("Yes").clicked() {
                                action_mark = Some(true);
                            }
                        });
                    } else {
                        ui.weak("Flip the card to answer");
                    }

                    ui.add_space(20.0);
                    if ui.button("Back to deck").clicked() {
                        action_back = true;
                    }
                }
            }
        });

        // Execute deferred actions
        if let Some(session) = &mut self.session {
            if action_flip {
                session.flip();
            }
            if let Some(correct) = action_mark {
                session.mark(correct);
            }
            if let Some(tally) = session.tally() {
                self.store.commit_tally(&tally);
                self.last_tally = Some(tally);
                self.session = None;
                self.current_screen = AppScreen::Results;
                return;
            }
        }
        if action_back {
            self.current_screen = match self.session.take() {
                Some(session) if self.store.deck(&session.deck_id).is_some() => {
                    AppScreen::Deck(session.deck_id)
                }
                _ => AppScreen::Home,
            };
        }
    }

    fn render_results_screen(&mut self, ctx: &egui::Context) {
        let Some(tally) = self.last_tally.clone() else {
            self.current_screen = AppScreen::Home;
            return;
        };
        let title = self
            .store
            .deck(&tally.deck_id)
            .map(|d| d.title.clone())
            .unwrap_or_default();

        let mut action_mode: Option<StudyMode> = None;
        let mut action_back = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Session complete");
                ui.label(&title);
                ui.heading(format!("{} / {}  ({}%)", tally.correct, tally.total, tally.pct()));

                ui.add_space(20.0);
                ui.horizontal(|ui| {
                    if ui.button("Study all again").clicked() {
                        action_mode = Some(StudyMode::All);
                    }
                    if ui.button("Review wrong only").clicked() {
                        action_mode = Some(tally.review_wrong_mode());
                    }
                });
                if ui.button("Back to deck").clicked() {
                    action_back = true;
                }
            });
        });

        if let Some(mode) = action_mode {
            self.start_session(&tally.deck_id, mode);
        }
        if action_back {
            self.current_screen = AppScreen::Deck(tally.deck_id.clone());
        }
    }

    fn render_missing(&mut self, ctx: &egui::Context, message: &str) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(message);
            if ui.button("Back to decks").clicked() {
                self.current_screen = AppScreen::Home;
            }
        });
    }

    fn start_session(&mut self, deck_id: &str, mode: StudyMode) {
        self.session = self.store.start_session(deck_id, mode);
        self.current_screen = AppScreen::Study;
    }

    /// Handles deck export to JSON file
    fn handle_export(&mut self, deck_id: &str) {
        if let Some(deck) = self.store.deck(deck_id) {
            if let Some(path) = rfd::FileDialog::new()
                .set_file_name(format!("{}.json", deck.title))
                .add_filter("JSON files", &["json"])
                .save_file()
            {
                self.notice = Some(match export_json_to_path(deck, &path) {
                    Ok(()) => format!("Deck '{}' exported successfully!", deck.title),
                    Err(e) => format!("Export failed: {}", e),
                });
            }
        }
        self.show_export_dialog = false;
    }

    /// Handles deck import from JSON file
    fn handle_import(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON files", &["json"])
            .pick_file()
        else {
            return;
        };

        self.notice = Some(match import_json(&path) {
            Ok(deck) => {
                let title = deck.title.clone();
                match self.store.import_deck(deck) {
                    Some(id) => {
                        let count = self.store.deck(&id).map(|d| d.cards.len()).unwrap_or(0);
                        format!("Deck '{}' imported with {} cards!", title.trim(), count)
                    }
                    None => format!("Deck '{}' could not be imported.", title),
                }
            }
            Err(e) => format!(
                "Import failed: {}\n\nThe file should look like:\n{{\n  \"title\": \"Deck Title\",\n  \"cards\": [...]\n}}",
                e
            ),
        });
    }
}
