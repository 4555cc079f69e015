use serde_json::{Map, Value};

use crate::config::ApiConfig;
use crate::mapper::{self, Record};
use crate::request::RequestParams;
use crate::service::SheetService;
use crate::store::StoreError;

/// Closed set of verb handlers an endpoint exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Put,
    Post,
    Delete,
}

impl Verb {
    /// Parse the `method` query parameter. An unknown verb is an explicit
    /// miss, handled upstream as a logged no-op.
    pub fn parse(method: &str) -> Option<Self> {
        match method {
            "GET" => Some(Self::Get),
            "PUT" => Some(Self::Put),
            "POST" => Some(Self::Post),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// Paging and filter parameters extracted from one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiParams {
    pub page: i64,
    pub limit: usize,
    /// One entry per header field: the raw query value if supplied, else an
    /// explicit null. Always fully populated.
    pub filters: Map<String, Value>,
}

impl ApiParams {
    pub fn from_request(req: &RequestParams, headers: &[String], api: &ApiConfig) -> Self {
        // The historical clamp is min(page - 1, 0), so every page above 1
        // collapses back to the first; corrected_paging opts into max.
        let page = match req.get("page").and_then(|p| p.parse::<i64>().ok()) {
            Some(p) if api.corrected_paging => (p - 1).max(0),
            Some(p) => (p - 1).min(0),
            None => 0,
        };

        let limit = match req.get("limit").and_then(|l| l.parse::<usize>().ok()) {
            Some(l) if l <= api.max_limit => l,
            _ => api.default_limit,
        };

        let mut filters = Map::new();
        for header in headers {
            let value = req
                .get(header)
                .map(|v| Value::String(v.to_string()))
                .unwrap_or(Value::Null);
            filters.insert(header.clone(), value);
        }

        Self {
            page,
            limit,
            filters,
        }
    }
}

/// Keep the records matching every filter key that is literally present in
/// the raw request parameters; programmatic-only keys do not constrain. A
/// filters value that is not object-shaped short-circuits to nothing.
pub fn filter_data(req: &RequestParams, records: &[Record], filters: &Value) -> Vec<Record> {
    let Some(filter_keys) = filters.as_object() else {
        return Vec::new();
    };
    records
        .iter()
        .filter(|record| {
            filter_keys.keys().all(|key| match req.get(key) {
                Some(supplied) => record
                    .get(key)
                    .map_or(false, |value| *value == Value::String(supplied.to_string())),
                None => true,
            })
        })
        .cloned()
        .collect()
}

/// Verb handlers bound to one sheet. The header list is captured when the
/// endpoint is built; a later schema change needs a rebuild.
#[derive(Debug, Clone)]
pub struct Endpoint {
    sheet: String,
    headers: Vec<String>,
}

impl Endpoint {
    pub fn build(sheet: &str, service: &SheetService) -> Result<Self, StoreError> {
        let headers = service.sheet_headers(sheet)?;
        Ok(Self {
            sheet: sheet.to_string(),
            headers,
        })
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    pub fn handle(
        &self,
        verb: Verb,
        req: &RequestParams,
        service: &SheetService,
        api: &ApiConfig,
    ) -> Result<Value, StoreError> {
        let params = ApiParams::from_request(req, &self.headers, api);
        match verb {
            Verb::Get => self.get(req, &params, service),
            Verb::Put => self.put(&params, service),
            Verb::Delete => self.delete(&params, service),
            Verb::Post => self.post(req, &params, service),
        }
    }

    /// Read: the enabled records matching the request filters, one page
    /// window of them.
    fn get(
        &self,
        req: &RequestParams,
        params: &ApiParams,
        service: &SheetService,
    ) -> Result<Value, StoreError> {
        let records = service.sheet_values(&self.sheet)?;
        let filters = overlay(base_enabled(), &params.filters);
        let matched = filter_data(req, &records, &Value::Object(filters));
        let start = (params.page * params.limit as i64).max(0) as usize;
        let page: Vec<Value> = matched
            .into_iter()
            .skip(start)
            .take(params.limit)
            .map(Value::Object)
            .collect();
        Ok(Value::Array(page))
    }

    /// Create: a new enabled row built from the request filters, next
    /// sequential id assigned.
    fn put(&self, params: &ApiParams, service: &SheetService) -> Result<Value, StoreError> {
        let record = overlay(base_enabled(), &params.filters);
        let created = service.create_row(&self.sheet, record)?;
        Ok(Value::Object(created))
    }

    /// Disable: a blind `{enabled: false}` write at the filtered id. An id of
    /// zero makes the save a silent no-op; the payload is returned either way.
    fn delete(&self, params: &ApiParams, service: &SheetService) -> Result<Value, StoreError> {
        let id = filters_id(&params.filters);
        let mut record = Record::new();
        record.insert("enabled".to_string(), Value::Bool(false));
        record.insert("_id".to_string(), Value::from(id));
        service.save_row(&self.sheet, &record)?;
        Ok(Value::Object(record))
    }

    /// Update: the enabled `users` row at the filtered id, overlaid with the
    /// request filters and persisted under this endpoint's sheet. The source
    /// sheet being `users` rather than the target is historical behavior,
    /// kept as-is.
    fn post(
        &self,
        req: &RequestParams,
        params: &ApiParams,
        service: &SheetService,
    ) -> Result<Value, StoreError> {
        let id = filters_id(&params.filters);
        let users = service.sheet_values("users")?;
        let mut probe = Map::new();
        probe.insert("_id".to_string(), Value::from(id));
        probe.insert("enabled".to_string(), Value::Bool(true));
        let matched = filter_data(req, &users, &Value::Object(probe));

        let base = matched.into_iter().next().unwrap_or_default();
        let merged = overlay(base, &params.filters);
        service.save_row(&self.sheet, &merged)?;
        Ok(Value::Object(merged))
    }
}

/// The `{enabled: true}` seed every read and write starts from.
fn base_enabled() -> Record {
    let mut record = Record::new();
    record.insert("enabled".to_string(), Value::Bool(true));
    record
}

/// Overlay `extra` onto `base`; extra wins on conflicting keys.
fn overlay(mut base: Record, extra: &Map<String, Value>) -> Record {
    for (key, value) in extra {
        base.insert(key.clone(), value.clone());
    }
    base
}

/// `_id` out of the filter map, defaulting to 0 for anything untruthy.
fn filters_id(filters: &Map<String, Value>) -> u64 {
    filters.get("_id").and_then(mapper::record_id).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn api() -> ApiConfig {
        ApiConfig {
            default_limit: 10,
            max_limit: 250,
            corrected_paging: false,
        }
    }

    fn headers() -> Vec<String> {
        vec!["name".to_string(), "status".to_string()]
    }

    #[test]
    fn page_defaults_to_zero() {
        let params = ApiParams::from_request(&RequestParams::of(&[]), &headers(), &api());
        assert_eq!(params.page, 0);
        assert_eq!(params.limit, 10);
    }

    #[test]
    fn page_clamp_collapses_high_pages() {
        let req = RequestParams::of(&[("page", "5")]);
        let params = ApiParams::from_request(&req, &headers(), &api());
        assert_eq!(params.page, 0);

        // page=0 goes negative under the literal rule
        let req = RequestParams::of(&[("page", "0")]);
        let params = ApiParams::from_request(&req, &headers(), &api());
        assert_eq!(params.page, -1);
    }

    #[test]
    fn corrected_paging_uses_the_non_negative_clamp() {
        let mut api = api();
        api.corrected_paging = true;
        let req = RequestParams::of(&[("page", "5")]);
        let params = ApiParams::from_request(&req, &headers(), &api);
        assert_eq!(params.page, 4);

        let req = RequestParams::of(&[("page", "0")]);
        let params = ApiParams::from_request(&req, &headers(), &api);
        assert_eq!(params.page, 0);
    }

    #[test]
    fn limit_rejects_values_over_the_cap() {
        let req = RequestParams::of(&[("limit", "300")]);
        assert_eq!(ApiParams::from_request(&req, &headers(), &api()).limit, 10);

        let req = RequestParams::of(&[("limit", "50")]);
        assert_eq!(ApiParams::from_request(&req, &headers(), &api()).limit, 50);

        let req = RequestParams::of(&[("limit", "banana")]);
        assert_eq!(ApiParams::from_request(&req, &headers(), &api()).limit, 10);
    }

    #[test]
    fn filters_are_fully_populated() {
        let req = RequestParams::of(&[("status", "a")]);
        let params = ApiParams::from_request(&req, &headers(), &api());
        assert_eq!(params.filters.get("status"), Some(&json!("a")));
        assert_eq!(params.filters.get("name"), Some(&Value::Null));
        assert_eq!(params.filters.len(), 2);
    }

    fn record(pairs: &[(&str, Value)]) -> Record {
        let mut map = Record::new();
        for (key, value) in pairs {
            map.insert(key.to_string(), value.clone());
        }
        map
    }

    #[test]
    fn only_raw_request_keys_constrain() {
        let records = vec![
            record(&[("status", json!("a")), ("enabled", json!(false))]),
            record(&[("status", json!("b")), ("enabled", json!(true))]),
        ];
        // enabled=true is programmatic only; status came in on the wire
        let req = RequestParams::of(&[("status", "a")]);
        let filters = json!({"status": "a", "enabled": true});
        let matched = filter_data(&req, &records, &filters);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].get("status"), Some(&json!("a")));
    }

    #[test]
    fn supplied_values_compare_as_raw_strings() {
        // parsed cell values are typed; the wire value stays a string and a
        // typed mismatch excludes the record
        let records = vec![record(&[("count", json!(3))])];
        let req = RequestParams::of(&[("count", "3")]);
        let matched = filter_data(&req, &records, &json!({"count": null}));
        assert!(matched.is_empty());
    }

    #[test]
    fn missing_record_field_excludes_when_filtered() {
        let records = vec![record(&[("name", json!("x"))])];
        let req = RequestParams::of(&[("status", "a")]);
        let matched = filter_data(&req, &records, &json!({"status": null}));
        assert!(matched.is_empty());
    }

    #[test]
    fn non_object_filters_short_circuit() {
        let records = vec![record(&[("name", json!("x"))])];
        let req = RequestParams::of(&[]);
        assert!(filter_data(&req, &records, &json!(["status"])).is_empty());
        assert!(filter_data(&req, &records, &Value::Null).is_empty());
    }

    #[test]
    fn unknown_verbs_are_a_miss() {
        assert_eq!(Verb::parse("GET"), Some(Verb::Get));
        assert_eq!(Verb::parse("PATCH"), None);
        assert_eq!(Verb::parse("get"), None);
    }
}
