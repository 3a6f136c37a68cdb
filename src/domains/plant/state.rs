use crate::environment::types::{CareTips, PdfDocument, Plant, PlantIdentification, Toxicity};

#[derive(Clone, Debug, PartialEq, Default)]
pub struct PlantState {
    /// Is any plant request in flight
    pub loading: bool,
    /// Export runs separately from the other requests
    pub pdf_loading: bool,
    pub plants: im::Vector<Plant>,
    pub selected_plant: Option<Plant>,
    pub identified_plant: Option<PlantIdentification>,
    pub care_tips: Option<CareTips>,
    pub toxicity_info: Option<Toxicity>,
    pub exported_pdf: Option<PdfDocument>,
    pub error: Option<String>,
}

impl PlantState {
    pub fn plant(&self, id: &str) -> Option<&Plant> {
        self.plants.iter().find(|p| p.id() == Some(id))
    }
}
