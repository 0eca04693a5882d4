//! Recurring template operations for the Tracker.

use log::info;

use super::Tracker;
use crate::{
    display::{Tasks, Templates, UpdateResult},
    error::{Result, TrackerError},
    models::{NewTemplate, RecurringTemplate, TaskFilter, TemplateChanges},
    params::{CreateTemplate, Id, ListTemplates, UpdateTemplate},
};

impl Tracker {
    /// Validates and stores a new template.
    pub async fn create_template(&self, params: &CreateTemplate) -> Result<RecurringTemplate> {
        let template = NewTemplate::try_from(params.clone())?;
        let created = self
            .with_database(move |db| db.create_template(&template))
            .await?;
        info!(
            "Created {} template {} '{}'",
            created.pattern.frequency.as_str(),
            created.id,
            created.name
        );
        Ok(created)
    }

    pub async fn get_template(&self, params: &Id) -> Result<Option<RecurringTemplate>> {
        let template_id = params.id;
        self.with_database(move |db| db.get_template(template_id))
            .await
    }

    pub async fn list_templates(&self, params: &ListTemplates) -> Result<Templates> {
        let owner_id = params.owner_id;
        let active_only = params.active_only;
        let templates = self
            .with_database(move |db| db.list_templates(owner_id, active_only))
            .await?;
        Ok(Templates(templates))
    }

    /// Tasks generated from a template that still exist, oldest first.
    /// Skipped and deleted instances are not listed.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::TemplateNotFound` for an unknown id.
    pub async fn template_instances(&self, params: &Id) -> Result<Tasks> {
        let template_id = params.id;
        let tasks = self
            .with_database(move |db| {
                if db.get_template(template_id)?.is_none() {
                    return Err(TrackerError::TemplateNotFound { id: template_id });
                }
                db.list_tasks(&TaskFilter {
                    template_id: Some(template_id),
                    ..TaskFilter::default()
                })
            })
            .await?;
        Ok(Tasks(tasks))
    }

    /// Applies a partial update. The merged template is revalidated before
    /// anything is written.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::InvalidInput` when no field is given or the
    /// result breaks a pattern rule, and `TrackerError::TemplateNotFound` for
    /// an unknown id.
    pub async fn update_template(
        &self,
        params: &UpdateTemplate,
    ) -> Result<UpdateResult<RecurringTemplate>> {
        let template_id = params.id;
        let changes = TemplateChanges::try_from(params.clone())?;
        if changes.is_empty() {
            return Err(TrackerError::invalid_input("update")
                .with_reason("at least one field must be provided"));
        }

        self.with_database(move |db| {
            let mut template = db
                .get_template(template_id)?
                .ok_or(TrackerError::TemplateNotFound { id: template_id })?;
            let descriptions = changes.apply_to(&mut template)?;
            let saved = db.save_template(&template)?;
            Ok(UpdateResult::with_changes(saved, descriptions))
        })
        .await
    }

    /// Deletes a template. Tasks it generated are kept.
    pub async fn delete_template(&self, params: &Id) -> Result<RecurringTemplate> {
        let template_id = params.id;
        self.with_database(move |db| db.delete_template(template_id))
            .await
    }
}
