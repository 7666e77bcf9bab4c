/*
[INPUT]:  Person ids, search terms and person fields
[OUTPUT]: Person envelopes, matches and related deals/products/activities
[POS]:    Resource layer - persons endpoints
[UPDATE]: When adding person endpoints or changing required fields
*/

use serde_json::{Value, json};

use crate::http::{PipedriveClient, PipedriveError, Result};
use crate::types::Envelope;

/// Persons are the contacts deals are made with; each may belong to an organization.
#[derive(Debug)]
pub struct Persons<'a> {
    client: &'a mut PipedriveClient,
}

impl PipedriveClient {
    /// Persons endpoints, borrowing this session for the duration of the handle
    pub fn persons(&mut self) -> Persons<'_> {
        Persons { client: self }
    }
}

impl Persons<'_> {
    /// List persons
    ///
    /// GET persons/
    pub async fn get_all(&mut self, params: &Value) -> Result<Envelope> {
        self.client.get("persons/", params).await
    }

    /// GET persons/{id}
    pub async fn get_by_id(&mut self, id: u64) -> Result<Envelope> {
        self.client.get(&format!("persons/{id}"), &()).await
    }

    /// Find persons by name
    ///
    /// GET persons/find?term={name}
    pub async fn get_by_name(&mut self, name: &str) -> Result<Envelope> {
        self.client.get("persons/find", &json!({ "term": name })).await
    }

    /// First person whose email matches, ignoring case
    ///
    /// GET persons/find?term={email}&search_by_email=1
    pub async fn get_by_email(&mut self, email: &str) -> Result<Option<Value>> {
        let envelope = self
            .client
            .get(
                "persons/find",
                &json!({ "term": email, "search_by_email": true }),
            )
            .await?;

        let Some(Value::Array(candidates)) = envelope.data() else {
            return Ok(None);
        };
        Ok(candidates
            .iter()
            .find(|candidate| has_email(candidate, email))
            .cloned())
    }

    /// Search persons by free-text term; empty when nothing matched
    ///
    /// GET searchResults?term={term}&item_type=person
    pub async fn search(&mut self, term: &str) -> Result<Vec<Value>> {
        let envelope = self
            .client
            .get(
                "searchResults",
                &json!({ "term": term, "item_type": "person" }),
            )
            .await?;

        Ok(match envelope.data() {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        })
    }

    /// Deals of a person. `data` must hold `id`; other fields go to the query.
    ///
    /// GET persons/{id}/deals
    pub async fn deals(&mut self, data: &Value) -> Result<Envelope> {
        self.related(data, "deals").await
    }

    /// GET persons/{id}/products
    pub async fn products(&mut self, data: &Value) -> Result<Envelope> {
        self.related(data, "products").await
    }

    /// GET persons/{id}/activities
    pub async fn activities(&mut self, data: &Value) -> Result<Envelope> {
        self.related(data, "activities").await
    }

    /// PUT persons/{id}
    pub async fn update(&mut self, id: u64, data: &Value) -> Result<Envelope> {
        self.client.put(&format!("persons/{id}"), data).await
    }

    /// Add a person; `name` is required
    ///
    /// POST persons
    pub async fn add(&mut self, data: &Value) -> Result<Envelope> {
        if data.get("name").is_none_or(Value::is_null) {
            return Err(PipedriveError::missing_field(
                "name",
                "You must include a \"name\" field when inserting a person",
            ));
        }
        self.client.post("persons", data).await
    }

    /// DELETE persons/{id}
    pub async fn delete(&mut self, id: u64) -> Result<Envelope> {
        self.client.delete(&format!("persons/{id}")).await
    }

    async fn related(&mut self, data: &Value, relation: &str) -> Result<Envelope> {
        let mut params = data.as_object().cloned().unwrap_or_default();
        let id = match params.shift_remove("id") {
            Some(Value::String(id)) => id,
            Some(Value::Number(id)) => id.to_string(),
            _ => {
                return Err(PipedriveError::missing_field(
                    "id",
                    format!("You must include the \"id\" of the person when getting {relation}"),
                ));
            }
        };
        self.client
            .get(&format!("persons/{id}/{relation}"), &params)
            .await
    }
}

/// Email may be a plain string or a list of `{ "value": .. }` entries
fn has_email(candidate: &Value, email: &str) -> bool {
    match candidate.get("email") {
        Some(Value::String(value)) => value.eq_ignore_ascii_case(email),
        Some(Value::Array(entries)) => entries.iter().any(|entry| {
            entry
                .get("value")
                .or(Some(entry))
                .and_then(Value::as_str)
                .is_some_and(|value| value.eq_ignore_ascii_case(email))
        }),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use wiremock::matchers::{body_string, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "test-token";

    async fn client_for(server: &MockServer) -> PipedriveClient {
        PipedriveClient::with_config(ClientConfig::new(server.uri(), TOKEN)).expect("client init")
    }

    #[tokio::test]
    async fn test_get_by_email_matches_case_insensitively() {
        let server = MockServer::start().await;
        let body = json!({
            "success": true,
            "data": [
                { "id": 1, "name": "Other", "email": "other@example.com" },
                { "id": 2, "name": "Ada", "email": [{ "value": "Ada@Example.com", "primary": true }] }
            ]
        });

        Mock::given(method("GET"))
            .and(path("/persons/find"))
            .and(query_param("term", "ada@example.com"))
            .and(query_param("search_by_email", "1"))
            .and(query_param("api_token", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = client_for(&server).await;
        let person = client
            .persons()
            .get_by_email("ada@example.com")
            .await
            .expect("get_by_email failed")
            .expect("person should match");

        assert_eq!(person["id"], 2);
    }

    #[tokio::test]
    async fn test_get_by_email_without_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/persons/find"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": null })),
            )
            .mount(&server)
            .await;

        let mut client = client_for(&server).await;
        let person = client
            .persons()
            .get_by_email("nobody@example.com")
            .await
            .expect("get_by_email failed");
        assert!(person.is_none());
    }

    #[tokio::test]
    async fn test_search_returns_data_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/searchResults"))
            .and(query_param("term", "Ada"))
            .and(query_param("item_type", "person"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [{ "id": 2, "type": "person", "title": "Ada" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = client_for(&server).await;
        let results = client.persons().search("Ada").await.expect("search failed");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["title"], "Ada");
    }

    #[tokio::test]
    async fn test_add_requires_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let mut client = client_for(&server).await;
        let err = client
            .persons()
            .add(&json!({ "email": "ada@example.com" }))
            .await
            .expect_err("name is required");

        assert!(matches!(err, PipedriveError::MissingField { ref field, .. } if field == "name"));
    }

    #[tokio::test]
    async fn test_add_posts_form_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/persons"))
            .and(query_param("api_token", TOKEN))
            .and(body_string("name=Ada%20Lovelace&org_id=7"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true,
                "data": { "id": 10, "name": "Ada Lovelace" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = client_for(&server).await;
        let envelope = client
            .persons()
            .add(&json!({ "name": "Ada Lovelace", "org_id": 7 }))
            .await
            .expect("add failed");
        assert_eq!(envelope.data().map(|data| &data["id"]), Some(&json!(10)));
    }

    #[tokio::test]
    async fn test_deals_requires_id_and_forwards_paging() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/persons/5/deals"))
            .and(query_param("start", "0"))
            .and(query_param("limit", "50"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": [] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut client = client_for(&server).await;
        let mut persons = client.persons();

        let err = persons
            .activities(&json!({ "limit": 5 }))
            .await
            .expect_err("id is required");
        assert!(matches!(err, PipedriveError::MissingField { ref field, .. } if field == "id"));

        persons
            .deals(&json!({ "id": 5, "start": 0, "limit": 50 }))
            .await
            .expect("deals failed");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/persons/3"))
            .and(body_string("phone%5B%5D=123&phone%5B%5D=456"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/persons/3"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": { "id": 3 } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut client = client_for(&server).await;
        client
            .persons()
            .update(3, &json!({ "phone": ["123", "456"] }))
            .await
            .expect("update failed");
        let deleted = client.persons().delete(3).await.expect("delete failed");
        assert_eq!(deleted.data(), Some(&json!({ "id": 3 })));
    }

    #[test]
    fn test_has_email_variants() {
        assert!(has_email(&json!({ "email": "A@B.com" }), "a@b.com"));
        assert!(has_email(&json!({ "email": ["x@y.com", "a@b.com"] }), "A@B.COM"));
        assert!(!has_email(&json!({ "email": [] }), "a@b.com"));
        assert!(!has_email(&json!({ "name": "No Email" }), "a@b.com"));
    }
}
