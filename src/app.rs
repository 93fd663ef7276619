use eframe::egui;

use crate::config::Config;
use crate::state::AppState;
use crate::ui::{pages, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct BoxOfficeApp {
    pub state: AppState,
}

impl BoxOfficeApp {
    pub fn new(config: &Config) -> Self {
        let mut state = AppState::default();
        state.page = config.page.into();
        if let Some(path) = &config.data {
            state.load(path);
        }
        Self { state }
    }
}

impl eframe::App for BoxOfficeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation + filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: current page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            pages::render_page(ui, self.state.page, &self.state);
        });
    }
}
