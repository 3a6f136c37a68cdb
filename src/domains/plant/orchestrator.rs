use super::action::PlantAction;
use crate::domains::{guarded, require};
use crate::effect::{Effect, RequestId};
use crate::environment::error::ApiError;
use crate::environment::types::{JournalEntryInput, PdfDocument, Plant};
use crate::environment::Environment;

/// Side effects for the plant domain. Runs after the reducer saw `action`.
pub fn orchestrate(action: &PlantAction, environment: &Environment) -> Effect<PlantAction> {
    use PlantAction::*;
    match action {
        FetchPlants(id) => {
            let id = *id;
            guarded(
                environment,
                Ok(()),
                |backend| async move { backend.plants().await },
                move |r| PlantsLoaded(id, r),
            )
        }
        AddPlant(id, plant) => {
            let id = *id;
            let plant = plant.clone();
            guarded(
                environment,
                require(&plant.name, "Plant name"),
                |backend| async move { backend.add_plant(&plant).await },
                move |r| PlantAdded(id, r),
            )
        }
        UpdatePlant(id, plant) => {
            let id = *id;
            let plant = plant.clone();
            let precondition = persisted_id(&plant).and_then(|_| require(&plant.name, "Plant name"));
            guarded(
                environment,
                precondition,
                |backend| async move {
                    let plant_id = persisted_id(&plant)?;
                    backend.update_plant(&plant_id, &plant).await
                },
                move |r| PlantUpdated(id, r),
            )
        }
        DeletePlant(id, plant_id) => {
            let id = *id;
            let plant_id = plant_id.clone();
            guarded(
                environment,
                require(&plant_id, "Plant id"),
                |backend| async move {
                    backend.delete_plant(&plant_id).await?;
                    Ok::<_, ApiError>(plant_id)
                },
                move |r| PlantDeleted(id, r),
            )
        }
        PlantDeleted(_, Ok(plant_id)) => {
            log::debug!("Deleted plant {plant_id}, reloading the collection");
            Effect::action(FetchPlants(RequestId::next()))
        }
        GetPlant(id, plant_id) => {
            let id = *id;
            let plant_id = plant_id.clone();
            guarded(
                environment,
                require(&plant_id, "Plant id"),
                |backend| async move { backend.plant(&plant_id).await },
                move |r| PlantLoaded(id, r),
            )
        }
        IdentifyPlant(id, image) => {
            let id = *id;
            let image = image.clone();
            let precondition = if image.is_empty() {
                Err(ApiError::invalid("An image is required"))
            } else {
                Ok(())
            };
            guarded(
                environment,
                precondition,
                |backend| async move { backend.identify_plant(&image).await },
                move |r| PlantIdentified(id, r),
            )
        }
        GetCareTips(id, name) => {
            let id = *id;
            let name = name.clone();
            guarded(
                environment,
                require(&name, "Scientific name"),
                |backend| async move { backend.care_tips(&name).await },
                move |r| CareTipsLoaded(id, r),
            )
        }
        GetToxicityInfo(id, name) => {
            let id = *id;
            let name = name.clone();
            guarded(
                environment,
                require(&name, "Scientific name"),
                |backend| async move { backend.toxicity_info(&name).await },
                move |r| ToxicityInfoLoaded(id, r),
            )
        }
        AddJournalEntry(id, plant_id, entry) => {
            let id = *id;
            let (plant_id, entry) = (plant_id.clone(), entry.clone());
            let precondition = require(&plant_id, "Plant id").and_then(|_| notes(&entry));
            guarded(
                environment,
                precondition,
                |backend| async move { backend.add_journal_entry(&plant_id, &entry).await },
                move |r| JournalEntryAdded(id, r),
            )
        }
        UpdateJournalEntry(id, plant_id, entry_id, entry) => {
            let id = *id;
            let (plant_id, entry_id, entry) = (plant_id.clone(), entry_id.clone(), entry.clone());
            let precondition = require(&plant_id, "Plant id")
                .and_then(|_| require(&entry_id, "Entry id"))
                .and_then(|_| notes(&entry));
            guarded(
                environment,
                precondition,
                |backend| async move {
                    backend
                        .update_journal_entry(&plant_id, &entry_id, &entry)
                        .await
                },
                move |r| JournalEntryUpdated(id, r),
            )
        }
        DeleteJournalEntry(id, plant_id, entry_id) => {
            let id = *id;
            let (plant_id, entry_id) = (plant_id.clone(), entry_id.clone());
            let precondition =
                require(&plant_id, "Plant id").and_then(|_| require(&entry_id, "Entry id"));
            guarded(
                environment,
                precondition,
                |backend| async move { backend.delete_journal_entry(&plant_id, &entry_id).await },
                move |r| JournalEntryDeleted(id, r),
            )
        }
        ExportPdf(id) => {
            let id = *id;
            guarded(
                environment,
                Ok(()),
                |backend| async move { backend.export_pdf().await.map(PdfDocument::new) },
                move |r| PdfExported(id, r),
            )
        }
        _ => Effect::NONE,
    }
}

fn persisted_id(plant: &Plant) -> Result<String, ApiError> {
    plant
        .id()
        .map(str::to_string)
        .ok_or_else(|| ApiError::invalid("Plant has not been saved yet"))
}

fn notes(entry: &JournalEntryInput) -> Result<(), ApiError> {
    require(&entry.notes, "Notes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::testing::{environment, resolve};
    use crate::environment::mock::MockBackend;
    use crate::environment::types::CareTips;

    fn aloe() -> Plant {
        Plant {
            care_tips: CareTips {
                light: Some("bright indirect".into()),
                ..Default::default()
            },
            ..Plant::draft("Aloe")
        }
    }

    #[tokio::test]
    async fn no_token_fails_without_network() {
        let mock = MockBackend::new();
        let (env, _dir) = environment(&mock, false);
        let requests = vec![
            PlantAction::FetchPlants(RequestId::next()),
            PlantAction::AddPlant(RequestId::next(), aloe()),
            PlantAction::DeletePlant(RequestId::next(), "p1".into()),
            PlantAction::ExportPdf(RequestId::next()),
            PlantAction::AddJournalEntry(
                RequestId::next(),
                "p1".into(),
                JournalEntryInput::new("watered"),
            ),
        ];
        for request in requests {
            let results = resolve(orchestrate(&request, &env)).await;
            assert_eq!(results.len(), 1);
            let (kind, _, ok) = results[0].completion().unwrap();
            assert_eq!(Some(kind), request.request().map(|r| r.0));
            assert!(!ok);
        }
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn missing_name_is_rejected_locally() {
        let mock = MockBackend::new();
        let (env, _dir) = environment(&mock, true);
        let results = resolve(orchestrate(
            &PlantAction::AddPlant(RequestId::next(), Plant::draft(" ")),
            &env,
        ))
        .await;
        assert!(matches!(
            &results[..],
            [PlantAction::PlantAdded(_, Err(ApiError::Invalid(_)))]
        ));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn update_requires_an_id() {
        let mock = MockBackend::new();
        let (env, _dir) = environment(&mock, true);
        let results = resolve(orchestrate(
            &PlantAction::UpdatePlant(RequestId::next(), aloe()),
            &env,
        ))
        .await;
        assert!(matches!(
            &results[..],
            [PlantAction::PlantUpdated(_, Err(ApiError::Invalid(_)))]
        ));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn add_returns_server_id() {
        let mock = MockBackend::new();
        let (env, _dir) = environment(&mock, true);
        let id = RequestId::next();
        let results = resolve(orchestrate(&PlantAction::AddPlant(id, aloe()), &env)).await;
        match &results[..] {
            [PlantAction::PlantAdded(result_id, Ok(plant))] => {
                assert_eq!(*result_id, id);
                assert_eq!(plant.name, "Aloe");
                assert!(plant.id().is_some());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn successful_delete_triggers_relist() {
        let mock = MockBackend::new();
        let (env, _dir) = environment(&mock, true);
        let deleted = PlantAction::PlantDeleted(RequestId::next(), Ok("p1".into()));
        let results = resolve(orchestrate(&deleted, &env)).await;
        assert!(matches!(&results[..], [PlantAction::FetchPlants(_)]));

        let failed = PlantAction::PlantDeleted(RequestId::next(), Err(ApiError::Timeout));
        assert!(orchestrate(&failed, &env).is_none());
    }

    #[tokio::test]
    async fn export_wraps_bytes() {
        let mock = MockBackend::new();
        let (env, _dir) = environment(&mock, true);
        let results = resolve(orchestrate(&PlantAction::ExportPdf(RequestId::next()), &env)).await;
        match &results[..] {
            [PlantAction::PdfExported(_, Ok(document))] => {
                assert!(document.data.starts_with(b"%PDF"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(mock.calls_to("export_pdf"), 1);
    }

    #[tokio::test]
    async fn blank_journal_notes_are_rejected() {
        let mock = MockBackend::new();
        let (env, _dir) = environment(&mock, true);
        let action = PlantAction::UpdateJournalEntry(
            RequestId::next(),
            "p1".into(),
            "e1".into(),
            JournalEntryInput::new(""),
        );
        let results = resolve(orchestrate(&action, &env)).await;
        assert!(matches!(
            &results[..],
            [PlantAction::JournalEntryUpdated(_, Err(ApiError::Invalid(_)))]
        ));
        assert_eq!(mock.calls(), 0);
    }
}
