//! Left-hand action toolbar and label editor, built from the registry.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use engine::actions::edit_node::EditRequest;
use engine::{
    ActionHistory, ActionKind, ActionStateRegistry, CurrentAction, RedoRequested, RegistryEntry,
    SelectActionEvent, UndoRequested,
};

pub struct ToolbarPlugin;

impl Plugin for ToolbarPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, toolbar_ui);
    }
}

fn to_color32(color: Color) -> egui::Color32 {
    let srgba = color.to_srgba();
    egui::Color32::from_rgb(
        (srgba.red * 255.0) as u8,
        (srgba.green * 255.0) as u8,
        (srgba.blue * 255.0) as u8,
    )
}

/// Scratch state for the label editor fields.
#[derive(Default)]
pub struct EditFields {
    target: String,
    label: String,
}

fn action_button(
    ui: &mut egui::Ui,
    registry: &ActionStateRegistry,
    current: ActionKind,
    entry: RegistryEntry,
    select_events: &mut EventWriter<SelectActionEvent>,
) {
    match entry {
        RegistryEntry::Type(id) => {
            let Some(ty) = registry.get(id) else {
                return;
            };
            let text = egui::RichText::new(format!("{} {}", ty.icon, ty.name))
                .color(to_color32(ty.color));
            let selected = ty.kind == current;
            if ui
                .selectable_label(selected, text)
                .on_hover_text(&ty.description)
                .clicked()
            {
                select_events.send(SelectActionEvent(ty.kind));
            }
        }
        RegistryEntry::Group(gid) => {
            let Some(group) = registry.group(gid) else {
                return;
            };
            let header = egui::RichText::new(format!("{} {}", group.icon, group.name))
                .color(to_color32(group.color));
            egui::CollapsingHeader::new(header)
                .default_open(true)
                .show(ui, |ui| {
                    for child in group.children.clone() {
                        action_button(ui, registry, current, child, select_events);
                    }
                });
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn toolbar_ui(
    mut contexts: EguiContexts,
    registry: Res<ActionStateRegistry>,
    current: Res<CurrentAction>,
    history: Res<ActionHistory>,
    mut select_events: EventWriter<SelectActionEvent>,
    mut undo_events: EventWriter<UndoRequested>,
    mut redo_events: EventWriter<RedoRequested>,
    mut edit: ResMut<EditRequest>,
    mut fields: Local<EditFields>,
) {
    egui::SidePanel::left("toolbar")
        .default_width(180.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.heading("Actions");
            for entry in registry.root_entries() {
                action_button(ui, &registry, current.kind, entry, &mut select_events);
            }

            ui.separator();
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(history.can_undo(), egui::Button::new("Undo"))
                    .clicked()
                {
                    undo_events.send(UndoRequested);
                }
                if ui
                    .add_enabled(history.can_redo(), egui::Button::new("Redo"))
                    .clicked()
                {
                    redo_events.send(RedoRequested);
                }
            });

            if current.kind == ActionKind::EditNode {
                ui.separator();
                ui.label("Edit label");
                ui.horizontal(|ui| {
                    ui.label("Node id:");
                    ui.text_edit_singleline(&mut fields.target);
                });
                ui.horizontal(|ui| {
                    ui.label("Label:");
                    ui.text_edit_singleline(&mut fields.label);
                });
                if ui.button("Apply").clicked() && !fields.target.is_empty() {
                    edit.target = Some(fields.target.clone());
                    edit.label = fields.label.clone();
                }
            }
        });
}
