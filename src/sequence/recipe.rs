//! Recipe lifecycle sequence.
//!
//! `ListAll → FindByTitle → Create → Update → Delete → VerifyDeleted`.
//! The category id captured from the first listed recipe seeds the create
//! body, and the title captured from the latest write is what the delete
//! response must echo.

use super::{Step, StepContext, StepFuture};
use crate::requests::{self, IngredientBody, InstructionBody, RecipeBody};
use crate::validators::{self, AssertionError};
use serde_json::Value;

// Seeded server data the harness asserts against. These are not produced by
// the harness; they are a content contract with the target environment.
const GOLDEN_TITLE: &str = "Chocolate Chip Cookies";
const GOLDEN_DESCRIPTION: &str =
    "Crispy on the outside, chewy on the inside, these cookies are a timeless classic.";
const GOLDEN_COOKING_TIME: i64 = 25;
const GOLDEN_SERVINGS: i64 = 24;
const GOLDEN_INGREDIENT_COUNT: usize = 9;
const GOLDEN_INSTRUCTION_COUNT: usize = 7;

/// The ordered recipe lifecycle steps.
pub fn recipe_lifecycle() -> &'static [Step] {
    const STEPS: &[Step] = &[
        Step::new("list all recipes", list_all),
        Step::new("find seeded recipe by title", find_by_title),
        Step::new("create recipe", create),
        Step::new("update recipe", update),
        Step::new("delete recipe", delete),
        Step::new("verify recipe deletion", verify_deleted),
    ];
    STEPS
}

fn list_all(cx: StepContext<'_>) -> StepFuture<'_> {
    Box::pin(async move {
        let response = cx.session.api.execute(&requests::recipe::list()).await?;
        response.require_success()?;

        let json = response.json()?;
        let recipes = validators::as_array(&json)?;
        if recipes.is_empty() {
            return Err(AssertionError::EmptyArray {
                field: "recipes".to_string(),
            }
            .into());
        }

        for recipe in recipes {
            validators::non_empty(recipe, "title")?;
            validators::non_empty(recipe, "ingredients")?;
            validators::non_empty(recipe, "instructions")?;
            validators::non_empty(recipe, "cookingTime")?;
            validators::non_empty(recipe, "category")?;
            validators::non_empty(recipe, "servings")?;
            validators::array_field(recipe, "ingredients")?;
            validators::array_field(recipe, "instructions")?;
        }

        let category = validators::lookup(&recipes[0], "category")?;
        let id = validators::non_empty_string(category, "_id")
            .map_err(|e| e.prefixed("category"))?;
        cx.state.set_first_category_id(id.to_string());
        Ok(())
    })
}

fn find_by_title(cx: StepContext<'_>) -> StepFuture<'_> {
    Box::pin(async move {
        let response = cx.session.api.execute(&requests::recipe::list()).await?;
        response.require_success()?;

        let json = response.json()?;
        let recipes = validators::as_array(&json)?;
        let wanted = recipes
            .iter()
            .find(|r| r.get("title").and_then(Value::as_str) == Some(GOLDEN_TITLE))
            .ok_or_else(|| AssertionError::ElementNotFound {
                field: "recipes".to_string(),
                what: format!("title `{}`", GOLDEN_TITLE),
            })?;

        validators::expect_str(wanted, "description", GOLDEN_DESCRIPTION)?;
        validators::expect_int(wanted, "cookingTime", GOLDEN_COOKING_TIME)?;
        validators::expect_int(wanted, "servings", GOLDEN_SERVINGS)?;
        validators::expect_len(wanted, "ingredients", GOLDEN_INGREDIENT_COUNT)?;
        validators::expect_len(wanted, "instructions", GOLDEN_INSTRUCTION_COUNT)?;
        Ok(())
    })
}

fn create(cx: StepContext<'_>) -> StepFuture<'_> {
    Box::pin(async move {
        let category_id = cx.state.first_category_id()?.to_string();
        let title = cx.fixture.recipe_title();
        let body = RecipeBody {
            title: title.clone(),
            description: "mega dobriq".to_string(),
            ingredients: vec![IngredientBody {
                name: "kori".to_string(),
                quantity: "20".to_string(),
            }],
            instructions: vec![InstructionBody {
                step: "call ur grandma".to_string(),
            }],
            cooking_time: 20,
            servings: 2,
            category: category_id,
        };

        let request = requests::recipe::create(&cx.session.token, &body);
        let response = cx.session.api.execute(&request).await?;
        response.require_success()?;

        let json = response.json()?;
        let id = validators::non_empty_string(&json, "_id")?.to_string();
        assert_recipe_round_trip(&json, &body)?;

        cx.state.set_created_recipe_id(id);
        cx.state.set_created_recipe_title(title);
        Ok(())
    })
}

fn update(cx: StepContext<'_>) -> StepFuture<'_> {
    Box::pin(async move {
        let id = cx.state.created_recipe_id()?.to_string();
        let category_id = cx.state.first_category_id()?.to_string();
        let title = cx.fixture.updated_recipe_title();
        let body = RecipeBody {
            title: title.clone(),
            description: "mega dobriq2".to_string(),
            ingredients: vec![IngredientBody {
                name: "eggs".to_string(),
                quantity: "2".to_string(),
            }],
            instructions: vec![InstructionBody {
                step: "call ur mom".to_string(),
            }],
            cooking_time: 30,
            servings: 5,
            category: category_id,
        };

        let request = requests::recipe::update(&cx.session.token, &id, &body);
        let response = cx.session.api.execute(&request).await?;
        response.require_success()?;

        let json = response.json()?;
        // The update must mutate in place, not re-create under a new id.
        validators::expect_str(&json, "_id", &id)?;
        assert_recipe_round_trip(&json, &body)?;

        cx.state.set_created_recipe_title(title);
        Ok(())
    })
}

fn delete(cx: StepContext<'_>) -> StepFuture<'_> {
    Box::pin(async move {
        let id = cx.state.created_recipe_id()?.to_string();
        let expected_title = cx.state.created_recipe_title()?.to_string();

        let request = requests::recipe::delete(&cx.session.token, &id);
        let response = cx.session.api.execute(&request).await?;
        response.require_success()?;

        // The deleted entity comes back; its title must be the updated one.
        let json = response.json()?;
        validators::expect_str(&json, "title", &expected_title)?;
        Ok(())
    })
}

fn verify_deleted(cx: StepContext<'_>) -> StepFuture<'_> {
    Box::pin(async move {
        let id = cx.state.created_recipe_id()?.to_string();

        let response = cx.session.api.execute(&requests::recipe::get(&id)).await?;
        // "Not found" is a success status with a literal null body on this
        // API, never an error status.
        response.require_success()?;
        validators::expect_null_body(&response.body)?;
        Ok(())
    })
}

/// Checks that every submitted field came back unchanged.
fn assert_recipe_round_trip(json: &Value, submitted: &RecipeBody) -> Result<(), AssertionError> {
    validators::expect_str(json, "title", &submitted.title)?;
    validators::expect_str(json, "description", &submitted.description)?;
    validators::expect_int(json, "cookingTime", i64::from(submitted.cooking_time))?;
    validators::expect_int(json, "servings", i64::from(submitted.servings))?;

    let ingredients = validators::array_field(json, "ingredients")?;
    validators::expect_len(json, "ingredients", submitted.ingredients.len())?;
    for (i, expected) in submitted.ingredients.iter().enumerate() {
        let label = format!("ingredients[{}]", i);
        validators::expect_str(&ingredients[i], "name", &expected.name)
            .map_err(|e| e.prefixed(&label))?;
        validators::expect_str(&ingredients[i], "quantity", &expected.quantity)
            .map_err(|e| e.prefixed(&label))?;
    }

    let instructions = validators::array_field(json, "instructions")?;
    validators::expect_len(json, "instructions", submitted.instructions.len())?;
    for (i, expected) in submitted.instructions.iter().enumerate() {
        let label = format!("instructions[{}]", i);
        validators::expect_str(&instructions[i], "step", &expected.step)
            .map_err(|e| e.prefixed(&label))?;
    }

    let category = validators::non_empty(json, "category")?;
    validators::expect_str(category, "_id", &submitted.category)
        .map_err(|e| e.prefixed("category"))?;
    Ok(())
}
