//! Category lifecycle sequence.
//!
//! `Create → ListAndFind → GetById → Update → VerifyOldNameGone →
//! GetByIdAfterUpdate → Delete → VerifyDeletedById`. The rename in the
//! middle is checked from both sides: the old name must vanish from the
//! listing and the new name must be readable by id.

use super::{Step, StepContext, StepFuture};
use crate::requests;
use crate::validators::{self, AssertionError};
use reqwest::StatusCode;
use serde_json::Value;

/// The ordered category lifecycle steps.
pub fn category_lifecycle() -> &'static [Step] {
    const STEPS: &[Step] = &[
        Step::new("create category", create),
        Step::new("list categories and find created", list_and_find),
        Step::new("get category by id", get_by_id),
        Step::new("update category name", update),
        Step::new("verify old name is gone", verify_old_name_gone),
        Step::new("get category by id after update", get_by_id_after_update),
        Step::new("delete category", delete),
        Step::new("verify category deletion by id", verify_deleted_by_id),
    ];
    STEPS
}

fn create(cx: StepContext<'_>) -> StepFuture<'_> {
    Box::pin(async move {
        let name = cx.fixture.category_name();
        let request = requests::category::create(&cx.session.token, &name);
        let response = cx.session.api.execute(&request).await?;
        response.require_success()?;

        let json = response.json()?;
        validators::non_empty_string(&json, "_id")?;
        Ok(())
    })
}

fn list_and_find(cx: StepContext<'_>) -> StepFuture<'_> {
    Box::pin(async move {
        let name = cx.fixture.category_name();
        let response = cx.session.api.execute(&requests::category::list()).await?;
        response.require_success()?;

        let json = response.json()?;
        let categories = validators::as_array(&json)?;
        if categories.is_empty() {
            return Err(AssertionError::EmptyArray {
                field: "categories".to_string(),
            }
            .into());
        }

        let found = categories
            .iter()
            .find(|c| c.get("name").and_then(Value::as_str) == Some(name.as_str()))
            .ok_or_else(|| AssertionError::ElementNotFound {
                field: "categories".to_string(),
                what: format!("name `{}`", name),
            })?;

        let id = validators::non_empty_string(found, "_id")?.to_string();
        let found_name = validators::string_field(found, "name")?.to_string();
        cx.state.set_created_category_id(id);
        cx.state.set_created_category_name(found_name);
        Ok(())
    })
}

fn get_by_id(cx: StepContext<'_>) -> StepFuture<'_> {
    Box::pin(async move {
        let id = cx.state.created_category_id()?.to_string();
        let name = cx.state.created_category_name()?.to_string();

        let response = cx.session.api.execute(&requests::category::get(&id)).await?;
        response.require_success()?;

        let json = response.json()?;
        validators::expect_str(&json, "_id", &id)?;
        validators::expect_str(&json, "name", &name)?;
        Ok(())
    })
}

fn update(cx: StepContext<'_>) -> StepFuture<'_> {
    Box::pin(async move {
        let id = cx.state.created_category_id()?.to_string();
        let new_name = cx.fixture.updated_category_name();

        let request = requests::category::update(&cx.session.token, &id, &new_name);
        let response = cx.session.api.execute(&request).await?;
        response.require_success()?;

        let json = response.json()?;
        validators::expect_str(&json, "name", &new_name)?;
        let updated_id = validators::non_empty_string(&json, "_id")?.to_string();

        cx.state.set_updated_category_id(updated_id);
        cx.state.set_updated_category_name(new_name);
        Ok(())
    })
}

fn verify_old_name_gone(cx: StepContext<'_>) -> StepFuture<'_> {
    Box::pin(async move {
        let old_name = cx.state.created_category_name()?.to_string();

        let response = cx.session.api.execute(&requests::category::list()).await?;
        response.require_success()?;

        let json = response.json()?;
        let categories = validators::as_array(&json)?;
        let still_there = categories
            .iter()
            .any(|c| c.get("name").and_then(Value::as_str) == Some(old_name.as_str()));
        if still_there {
            // A rename must mutate the existing entity, not add a sibling.
            return Err(AssertionError::ElementStillPresent {
                field: "categories".to_string(),
                what: format!("name `{}`", old_name),
            }
            .into());
        }
        Ok(())
    })
}

fn get_by_id_after_update(cx: StepContext<'_>) -> StepFuture<'_> {
    Box::pin(async move {
        let id = cx.state.updated_category_id()?.to_string();
        let name = cx.state.updated_category_name()?.to_string();

        let response = cx.session.api.execute(&requests::category::get(&id)).await?;
        response.require_success()?;

        let json = response.json()?;
        validators::expect_str(&json, "name", &name)?;
        Ok(())
    })
}

fn delete(cx: StepContext<'_>) -> StepFuture<'_> {
    Box::pin(async move {
        let id = cx.state.updated_category_id()?.to_string();

        let request = requests::category::delete(&cx.session.token, &id);
        let response = cx.session.api.execute(&request).await?;
        response.require_success()?;
        response.require_status(StatusCode::OK)?;
        Ok(())
    })
}

fn verify_deleted_by_id(cx: StepContext<'_>) -> StepFuture<'_> {
    Box::pin(async move {
        let id = cx.state.updated_category_id()?.to_string();

        let response = cx.session.api.execute(&requests::category::get(&id)).await?;
        // The server reports success even for a missing category; absence is
        // encoded as a literal null body.
        response.require_status(StatusCode::OK)?;
        validators::expect_null_body(&response.body)?;
        Ok(())
    })
}
