use super::action::PlantAction;
use super::state::PlantState;
use crate::environment::error::ApiError;
use crate::environment::types::Plant;
use crate::helper::{remove_by_id, replace_by_id, replace_if_same};

/// Pure state transition for the plant domain.
pub fn reduce(action: &PlantAction, state: &mut PlantState) {
    use PlantAction::*;
    match action {
        FetchPlants(_)
        | AddPlant(..)
        | UpdatePlant(..)
        | DeletePlant(..)
        | GetPlant(..)
        | IdentifyPlant(..)
        | GetCareTips(..)
        | GetToxicityInfo(..)
        | AddJournalEntry(..)
        | UpdateJournalEntry(..)
        | DeleteJournalEntry(..) => {
            state.loading = true;
            state.error = None;
        }
        ExportPdf(_) => {
            state.pdf_loading = true;
            state.error = None;
        }
        PlantsLoaded(_, result) => finish(state, result, |state, plants| {
            state.plants = plants.iter().cloned().collect();
        }),
        PlantAdded(_, result) => finish(state, result, |state, plant| {
            state.plants.push_back(plant.clone());
        }),
        PlantUpdated(_, result)
        | JournalEntryAdded(_, result)
        | JournalEntryUpdated(_, result)
        | JournalEntryDeleted(_, result) => finish(state, result, replace_plant),
        PlantDeleted(_, result) => finish(state, result, |state, id| {
            remove_by_id(&mut state.plants, id, Plant::id);
            if state.selected_plant.as_ref().and_then(Plant::id) == Some(id.as_str()) {
                state.selected_plant = None;
            }
        }),
        PlantLoaded(_, result) => finish(state, result, |state, plant| {
            state.selected_plant = Some(plant.clone());
        }),
        PlantIdentified(_, result) => finish(state, result, |state, identification| {
            state.identified_plant = Some(identification.clone());
        }),
        CareTipsLoaded(_, result) => finish(state, result, |state, tips| {
            state.care_tips = Some(tips.clone());
        }),
        ToxicityInfoLoaded(_, result) => finish(state, result, |state, info| {
            state.toxicity_info = Some(info.clone());
        }),
        PdfExported(_, result) => {
            state.pdf_loading = false;
            match result {
                Ok(document) => state.exported_pdf = Some(document.clone()),
                Err(e) => state.error = Some(e.user_message()),
            }
        }
        ClearIdentification => {
            state.identified_plant = None;
            state.care_tips = None;
            state.toxicity_info = None;
        }
        ClearError => state.error = None,
        Reset => *state = PlantState::default(),
    }
}

fn finish<T>(
    state: &mut PlantState,
    result: &Result<T, ApiError>,
    apply: impl FnOnce(&mut PlantState, &T),
) {
    state.loading = false;
    match result {
        Ok(value) => apply(state, value),
        Err(e) => state.error = Some(e.user_message()),
    }
}

// The server answers journal calls with the whole plant, so all of them
// merge the same way as a plant update.
fn replace_plant(state: &mut PlantState, plant: &Plant) {
    if !replace_by_id(&mut state.plants, plant.clone(), Plant::id) {
        log::debug!("Updated plant {:?} is not in the collection", plant.id);
    }
    replace_if_same(&mut state.selected_plant, plant, Plant::id);
}
