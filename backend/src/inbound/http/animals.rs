//! Livestock record handlers.
//!
//! ```text
//! GET /api/v1/animals?species=cattle&search=daisy
//! POST /api/v1/animals {"species":"cattle","name":"Daisy","tagNumber":"UG-001"}
//! GET|PATCH|DELETE /api/v1/animals/{id}
//! POST /api/v1/animals/{id}/vaccinations {"vaccine":"FMD","administeredOn":"2026-03-01"}
//! POST /api/v1/animals/{id}/treatments {"treatment":"Deworming","administeredOn":"2026-03-02"}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Animal, AnimalFilter, AnimalPatch, AnimalSex, Error, NewAnimal, NewTreatment, NewVaccination,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

const ANIMAL_ID: FieldName = FieldName::new("id");

/// Body for `POST /animals`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnimalBody {
    #[schema(example = "cattle")]
    pub species: String,
    pub breed: Option<String>,
    pub name: Option<String>,
    pub sex: Option<AnimalSex>,
    pub date_of_birth: Option<NaiveDate>,
    pub colour: Option<String>,
    pub tag_number: Option<String>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
}

impl From<CreateAnimalBody> for NewAnimal {
    fn from(body: CreateAnimalBody) -> Self {
        Self {
            species: body.species,
            breed: body.breed,
            name: body.name,
            sex: body.sex,
            date_of_birth: body.date_of_birth,
            colour: body.colour,
            tag_number: body.tag_number,
            photo_url: body.photo_url,
            notes: body.notes,
        }
    }
}

/// Body for `PATCH /animals/{id}`. Blank strings clear optional fields.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnimalBody {
    pub species: Option<String>,
    pub breed: Option<String>,
    pub name: Option<String>,
    pub sex: Option<AnimalSex>,
    pub date_of_birth: Option<NaiveDate>,
    pub colour: Option<String>,
    pub tag_number: Option<String>,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
}

impl From<UpdateAnimalBody> for AnimalPatch {
    fn from(body: UpdateAnimalBody) -> Self {
        Self {
            species: body.species,
            breed: body.breed,
            name: body.name,
            sex: body.sex,
            date_of_birth: body.date_of_birth,
            colour: body.colour,
            tag_number: body.tag_number,
            photo_url: body.photo_url,
            notes: body.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnimalListQuery {
    /// Exact species match, case-insensitive.
    pub species: Option<String>,
    /// Substring of name, tag number, or breed.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VaccinationBody {
    #[schema(example = "FMD")]
    pub vaccine: String,
    pub administered_on: NaiveDate,
    pub next_due_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentBody {
    #[schema(example = "Deworming")]
    pub treatment: String,
    pub administered_on: NaiveDate,
    pub notes: Option<String>,
}

/// Animals owned by the caller.
#[utoipa::path(
    get,
    path = "/api/v1/animals",
    params(AnimalListQuery),
    responses(
        (status = 200, description = "Caller's animals", body = [Animal]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a livestock owner", body = Error)
    ),
    tags = ["animals"],
    operation_id = "listAnimals"
)]
#[get("/animals")]
pub async fn list_animals(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AnimalListQuery>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let AnimalListQuery { species, search } = query.into_inner();
    let animals = state
        .animals_query
        .list(&actor, AnimalFilter { species, search })
        .await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(animals))
}

#[utoipa::path(
    post,
    path = "/api/v1/animals",
    request_body = CreateAnimalBody,
    responses(
        (status = 201, description = "Animal registered", body = Animal),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a livestock owner", body = Error)
    ),
    tags = ["animals"],
    operation_id = "createAnimal"
)]
#[post("/animals")]
pub async fn create_animal(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateAnimalBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let animal = state
        .animals
        .create(&actor, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(animal))
}

#[utoipa::path(
    get,
    path = "/api/v1/animals/{id}",
    params(("id" = String, Path, description = "Animal id")),
    responses(
        (status = 200, description = "Animal", body = Animal),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "Not found or not owned", body = Error)
    ),
    tags = ["animals"],
    operation_id = "getAnimal"
)]
#[get("/animals/{id}")]
pub async fn get_animal(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let id = parse_uuid(&path, ANIMAL_ID)?;
    let animal = state.animals_query.get(&actor, id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(animal))
}

#[utoipa::path(
    patch,
    path = "/api/v1/animals/{id}",
    params(("id" = String, Path, description = "Animal id")),
    request_body = UpdateAnimalBody,
    responses(
        (status = 200, description = "Updated animal", body = Animal),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found or not owned", body = Error)
    ),
    tags = ["animals"],
    operation_id = "updateAnimal"
)]
#[patch("/animals/{id}")]
pub async fn update_animal(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateAnimalBody>,
) -> ApiResult<web::Json<Animal>> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let id = parse_uuid(&path, ANIMAL_ID)?;
    let animal = state
        .animals
        .update(&actor, id, payload.into_inner().into())
        .await?;
    Ok(web::Json(animal))
}

/// Delete an animal. Cases that referenced it keep their history.
#[utoipa::path(
    delete,
    path = "/api/v1/animals/{id}",
    params(("id" = String, Path, description = "Animal id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found or not owned", body = Error)
    ),
    tags = ["animals"],
    operation_id = "deleteAnimal"
)]
#[delete("/animals/{id}")]
pub async fn delete_animal(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let id = parse_uuid(&path, ANIMAL_ID)?;
    state.animals.delete(&actor, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/api/v1/animals/{id}/vaccinations",
    params(("id" = String, Path, description = "Animal id")),
    request_body = VaccinationBody,
    responses(
        (status = 201, description = "Vaccination recorded", body = Animal),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found or not owned", body = Error)
    ),
    tags = ["animals"],
    operation_id = "addVaccination"
)]
#[post("/animals/{id}/vaccinations")]
pub async fn add_vaccination(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<VaccinationBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let id = parse_uuid(&path, ANIMAL_ID)?;
    let body = payload.into_inner();
    let animal = state
        .animals
        .add_vaccination(
            &actor,
            id,
            NewVaccination {
                vaccine: body.vaccine,
                administered_on: body.administered_on,
                next_due_on: body.next_due_on,
                notes: body.notes,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(animal))
}

#[utoipa::path(
    post,
    path = "/api/v1/animals/{id}/treatments",
    params(("id" = String, Path, description = "Animal id")),
    request_body = TreatmentBody,
    responses(
        (status = 201, description = "Treatment recorded", body = Animal),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found or not owned", body = Error)
    ),
    tags = ["animals"],
    operation_id = "addTreatment"
)]
#[post("/animals/{id}/treatments")]
pub async fn add_treatment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<TreatmentBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor(state.accounts_query.as_ref()).await?;
    let id = parse_uuid(&path, ANIMAL_ID)?;
    let body = payload.into_inner();
    let animal = state
        .animals
        .add_treatment(
            &actor,
            id,
            NewTreatment {
                treatment: body.treatment,
                administered_on: body.administered_on,
                notes: body.notes,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(animal))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    use crate::domain::Role;
    use crate::inbound::http::test_utils::{api_app, memory_state, register};

    #[actix_web::test]
    async fn owners_manage_their_herd() {
        let app = test::init_service(api_app(memory_state().1)).await;
        let (cookie, _) = register(&app, Role::Owner, "Amina Nakato").await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/animals")
                .cookie(cookie.clone())
                .set_json(json!({"species": "cattle", "name": "Daisy", "tagNumber": "UG-001"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let animal: Value = test::read_body_json(res).await;
        let id = animal["id"].as_str().expect("id").to_owned();

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/animals/{id}/vaccinations"))
                .cookie(cookie.clone())
                .set_json(json!({"vaccine": "FMD", "administeredOn": "2026-03-01"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let animal: Value = test::read_body_json(res).await;
        assert_eq!(animal["vaccinations"][0]["vaccine"], "FMD");

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/animals?search=ug-0")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        let listed: Value = test::read_body_json(res).await;
        assert_eq!(listed.as_array().map(Vec::len), Some(1));

        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/v1/animals/{id}"))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/animals/{id}"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn other_owners_animals_are_hidden() {
        let app = test::init_service(api_app(memory_state().1)).await;
        let (owner, _) = register(&app, Role::Owner, "Amina Nakato").await;
        let (stranger, _) = register(&app, Role::Owner, "Peter Mugisha").await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/animals")
                .cookie(owner)
                .set_json(json!({"species": "goat"}))
                .to_request(),
        )
        .await;
        let animal: Value = test::read_body_json(res).await;
        let id = animal["id"].as_str().expect("id");

        let res = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!("/api/v1/animals/{id}"))
                .cookie(stranger)
                .set_json(json!({"name": "Mine now"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn sellers_cannot_keep_animals() {
        let app = test::init_service(api_app(memory_state().1)).await;
        let (seller, _) = register(&app, Role::Seller, "Brian Okello").await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/animals")
                .cookie(seller)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn malformed_ids_are_invalid_requests() {
        let app = test::init_service(api_app(memory_state().1)).await;
        let (owner, _) = register(&app, Role::Owner, "Amina Nakato").await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/animals/not-a-uuid")
                .cookie(owner)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["code"], "invalid_uuid");
    }
}
