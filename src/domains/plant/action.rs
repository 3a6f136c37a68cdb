use strum_macros::{Display, IntoStaticStr};

use crate::effect::RequestId;
use crate::environment::error::ApiError;
use crate::environment::types::{
    CareTips, EntryId, JournalEntryInput, PdfDocument, Plant, PlantId, PlantIdentification,
    Toxicity,
};

/// One variant per request kind. Only the most recent request of a kind
/// can change state.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Display, IntoStaticStr)]
pub enum PlantOperation {
    FetchPlants,
    AddPlant,
    UpdatePlant,
    DeletePlant,
    GetPlant,
    IdentifyPlant,
    GetCareTips,
    GetToxicityInfo,
    AddJournalEntry,
    UpdateJournalEntry,
    DeleteJournalEntry,
    ExportPdf,
}

#[allow(clippy::large_enum_variant)]
#[derive(Clone, Debug)]
pub enum PlantAction {
    FetchPlants(RequestId),
    PlantsLoaded(RequestId, Result<Vec<Plant>, ApiError>),

    AddPlant(RequestId, Plant),
    PlantAdded(RequestId, Result<Plant, ApiError>),

    UpdatePlant(RequestId, Plant),
    PlantUpdated(RequestId, Result<Plant, ApiError>),

    DeletePlant(RequestId, PlantId),
    PlantDeleted(RequestId, Result<PlantId, ApiError>),

    GetPlant(RequestId, PlantId),
    PlantLoaded(RequestId, Result<Plant, ApiError>),

    /// Raw image bytes
    IdentifyPlant(RequestId, Vec<u8>),
    PlantIdentified(RequestId, Result<PlantIdentification, ApiError>),

    /// By scientific name
    GetCareTips(RequestId, String),
    CareTipsLoaded(RequestId, Result<CareTips, ApiError>),

    GetToxicityInfo(RequestId, String),
    ToxicityInfoLoaded(RequestId, Result<Toxicity, ApiError>),

    AddJournalEntry(RequestId, PlantId, JournalEntryInput),
    JournalEntryAdded(RequestId, Result<Plant, ApiError>),

    UpdateJournalEntry(RequestId, PlantId, EntryId, JournalEntryInput),
    JournalEntryUpdated(RequestId, Result<Plant, ApiError>),

    DeleteJournalEntry(RequestId, PlantId, EntryId),
    JournalEntryDeleted(RequestId, Result<Plant, ApiError>),

    ExportPdf(RequestId),
    PdfExported(RequestId, Result<PdfDocument, ApiError>),

    /// Drop the identification result without using it
    ClearIdentification,
    ClearError,
    Reset,
}

impl PlantAction {
    /// The kind and id of a request action
    pub fn request(&self) -> Option<(PlantOperation, RequestId)> {
        use PlantAction::*;
        let request = match self {
            FetchPlants(id) => (PlantOperation::FetchPlants, *id),
            AddPlant(id, _) => (PlantOperation::AddPlant, *id),
            UpdatePlant(id, _) => (PlantOperation::UpdatePlant, *id),
            DeletePlant(id, _) => (PlantOperation::DeletePlant, *id),
            GetPlant(id, _) => (PlantOperation::GetPlant, *id),
            IdentifyPlant(id, _) => (PlantOperation::IdentifyPlant, *id),
            GetCareTips(id, _) => (PlantOperation::GetCareTips, *id),
            GetToxicityInfo(id, _) => (PlantOperation::GetToxicityInfo, *id),
            AddJournalEntry(id, _, _) => (PlantOperation::AddJournalEntry, *id),
            UpdateJournalEntry(id, _, _, _) => (PlantOperation::UpdateJournalEntry, *id),
            DeleteJournalEntry(id, _, _) => (PlantOperation::DeleteJournalEntry, *id),
            ExportPdf(id) => (PlantOperation::ExportPdf, *id),
            _ => return None,
        };
        Some(request)
    }

    /// The kind, id and success of a result action
    pub fn completion(&self) -> Option<(PlantOperation, RequestId, bool)> {
        use PlantAction::*;
        let completion = match self {
            PlantsLoaded(id, r) => (PlantOperation::FetchPlants, *id, r.is_ok()),
            PlantAdded(id, r) => (PlantOperation::AddPlant, *id, r.is_ok()),
            PlantUpdated(id, r) => (PlantOperation::UpdatePlant, *id, r.is_ok()),
            PlantDeleted(id, r) => (PlantOperation::DeletePlant, *id, r.is_ok()),
            PlantLoaded(id, r) => (PlantOperation::GetPlant, *id, r.is_ok()),
            PlantIdentified(id, r) => (PlantOperation::IdentifyPlant, *id, r.is_ok()),
            CareTipsLoaded(id, r) => (PlantOperation::GetCareTips, *id, r.is_ok()),
            ToxicityInfoLoaded(id, r) => (PlantOperation::GetToxicityInfo, *id, r.is_ok()),
            JournalEntryAdded(id, r) => (PlantOperation::AddJournalEntry, *id, r.is_ok()),
            JournalEntryUpdated(id, r) => (PlantOperation::UpdateJournalEntry, *id, r.is_ok()),
            JournalEntryDeleted(id, r) => (PlantOperation::DeleteJournalEntry, *id, r.is_ok()),
            PdfExported(id, r) => (PlantOperation::ExportPdf, *id, r.is_ok()),
            _ => return None,
        };
        Some(completion)
    }
}
