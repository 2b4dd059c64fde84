//! Rust client and service structs.

use super::ident::{field_identifier, type_identifier};
use super::models::doc_comment;
use crate::codegen::naming::IdentScope;
use crate::codegen::{indent, service_type_name};
use crate::ir::{IrOptions, ModelRef, ProcedureDecl, ServiceDecl};
use crate::schema::HttpMethod;

/// Renders the root client and every nested service, parents first.
pub fn render_services(root: &ServiceDecl, options: &IrOptions) -> String {
    let mut output = String::new();
    render_service(root, options, &mut output);
    output
}

fn render_service(service: &ServiceDecl, options: &IrOptions, output: &mut String) {
    let name = type_identifier(&service_type_name(options, &service.path));

    let mut fields = IdentScope::new();
    let children: Vec<(String, String)> = service
        .services
        .iter()
        .map(|child| {
            (
                fields.claim(field_identifier(&child.name), "_"),
                type_identifier(&service_type_name(options, &child.path)),
            )
        })
        .collect();

    output.push_str(&format!("pub struct {} {{\n", name));
    output.push_str("    _config_: Arc<RpcClientConfig>,\n");
    for (field, type_name) in &children {
        output.push_str(&format!("    pub {}: {},\n", field, type_name));
    }
    output.push_str("}\n\n");

    output.push_str(&format!("impl RpcClientService for {} {{\n", name));
    output.push_str("    fn create(config: Arc<RpcClientConfig>) -> Self {\n");
    output.push_str("        Self {\n");
    for (field, type_name) in &children {
        output.push_str(&format!(
            "            {}: <{} as RpcClientService>::create(config.clone()),\n",
            field, type_name
        ));
    }
    output.push_str("            _config_: config,\n");
    output.push_str("        }\n");
    output.push_str("    }\n");
    output.push_str("}\n");

    if !service.procedures.is_empty() {
        let mut methods = IdentScope::new();
        output.push_str(&format!("\nimpl {} {{\n", name));
        let rendered: Vec<String> = service
            .procedures
            .iter()
            .map(|procedure| {
                let ident = methods.claim(field_identifier(&procedure.name), "_");
                indent::block(&render_procedure(procedure, &ident), 4)
            })
            .collect();
        output.push_str(&rendered.join("\n\n"));
        output.push_str("\n}\n");
    }

    for child in &service.services {
        output.push('\n');
        render_service(child, options, output);
    }
}

fn method_variant(method: HttpMethod) -> &'static str {
    match method {
        HttpMethod::Get => "HttpMethod::Get",
        HttpMethod::Post => "HttpMethod::Post",
        HttpMethod::Put => "HttpMethod::Put",
        HttpMethod::Patch => "HttpMethod::Patch",
        HttpMethod::Delete => "HttpMethod::Delete",
    }
}

fn model_type(model: &ModelRef) -> String {
    type_identifier(&model.name)
}

fn render_procedure(procedure: &ProcedureDecl, ident: &str) -> String {
    let mut output = doc_comment(procedure.description.as_deref(), procedure.is_deprecated);

    let response = procedure
        .response
        .as_ref()
        .map(model_type)
        .unwrap_or_else(|| "()".to_string());

    let mut args = vec!["&self".to_string()];
    if let Some(params) = &procedure.params {
        args.push(format!("params: {}", model_type(params)));
    }

    if procedure.is_event_stream {
        args.push("on_event: OnEvent".to_string());
        output.push_str(&format!(
            "pub async fn {}<OnEvent>({}) -> Result<(), RpcError>\nwhere\n    OnEvent: FnMut(SseEvent<{}>, &mut SseController),\n{{\n",
            ident,
            args.join(", "),
            response
        ));
    } else {
        let returns = if procedure.response.is_some() {
            response.clone()
        } else {
            "()".to_string()
        };
        output.push_str(&format!(
            "pub async fn {}({}) -> Result<{}, RpcError> {{\n",
            ident,
            args.join(", "),
            returns
        ));
    }

    let transports = procedure
        .transports
        .iter()
        .map(|t| format!("{:?}", t))
        .collect::<Vec<_>>()
        .join(", ");
    output.push_str(&format!(
        "    self._config_.ensure_transport({:?}, &[{}])?;\n",
        procedure.full_name, transports
    ));

    let mut request = format!(
        "RpcRequest::new(&self._config_, {}, {:?})",
        method_variant(procedure.method),
        procedure.path
    );
    if procedure.params.is_some() {
        if procedure.method.uses_query_string() {
            request.push_str("\n    .query(params.to_query_params_string())");
        } else {
            request.push_str("\n    .body(params.to_json_string())");
        }
    }

    if procedure.is_event_stream {
        let parse = match &procedure.response {
            Some(model) => format!("|body: String| {}::from_json_string(body)", model_type(model)),
            None => "|_body: String| ()".to_string(),
        };
        output.push_str(&format!(
            "    {}\n        .event_stream({}, on_event)\n        .await\n",
            indent::tail(&request, 4),
            parse
        ));
    } else {
        let binding = if procedure.response.is_some() { "body" } else { "_body" };
        output.push_str(&format!(
            "    let {} = {}\n        .send()\n        .await?;\n",
            binding,
            indent::tail(&request, 4)
        ));
        match &procedure.response {
            Some(model) => output.push_str(&format!(
                "    Ok({}::from_json_string(body))\n",
                model_type(model)
            )),
            None => output.push_str("    Ok(())\n"),
        }
    }
    output.push('}');
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::build;
    use crate::schema::AppDefinition;
    use serde_json::json;

    fn render(value: serde_json::Value) -> String {
        let app = AppDefinition::from_value(value).unwrap();
        let options = IrOptions {
            type_prefix: String::new(),
            root_service: "Test".to_string(),
            ..IrOptions::default()
        };
        let ir = build(&app, &options).unwrap();
        render_services(&ir.root, &options)
    }

    fn definitions() -> serde_json::Value {
        json!({
            "UserParams": { "properties": { "userId": { "type": "string" } } },
            "User": { "properties": { "id": { "type": "string" } } }
        })
    }

    #[test]
    fn test_get_uses_query_string() {
        let code = render(json!({
            "procedures": {
                "users.getUser": {
                    "path": "/users/get-user",
                    "method": "get",
                    "params": "UserParams",
                    "response": "User"
                }
            },
            "definitions": definitions()
        }));

        assert!(code.contains(
            "pub struct TestClient {\n    _config_: Arc<RpcClientConfig>,\n    pub users: TestUsersService,\n}"
        ));
        assert!(code.contains(
            "users: <TestUsersService as RpcClientService>::create(config.clone()),"
        ));
        assert!(code.contains(
            "pub async fn get_user(&self, params: UserParams) -> Result<User, RpcError> {"
        ));
        assert!(code.contains("self._config_.ensure_transport(\"users.getUser\", &[\"http\"])?;"));
        assert!(code.contains(
            "RpcRequest::new(&self._config_, HttpMethod::Get, \"/users/get-user\")"
        ));
        assert!(code.contains(".query(params.to_query_params_string())"));
        assert!(!code.contains(".body("));
        assert!(code.contains("Ok(User::from_json_string(body))"));
    }

    #[test]
    fn test_post_uses_body_and_unit_response() {
        let code = render(json!({
            "procedures": {
                "users.updateUser": { "path": "/users/update-user", "method": "post", "params": "User" }
            },
            "definitions": definitions()
        }));
        assert!(code.contains(
            "pub async fn update_user(&self, params: User) -> Result<(), RpcError> {"
        ));
        assert!(code.contains(".body(params.to_json_string())"));
        assert!(code.contains("let _body = RpcRequest::new"));
        assert!(code.contains("Ok(())"));
    }

    #[test]
    fn test_event_stream() {
        let code = render(json!({
            "procedures": {
                "watchUser": {
                    "path": "/watch-user",
                    "method": "get",
                    "params": "UserParams",
                    "response": "User",
                    "isEventStream": true,
                    "transports": ["http", "ws"]
                }
            },
            "definitions": definitions()
        }));
        assert!(code.contains(
            "pub async fn watch_user<OnEvent>(&self, params: UserParams, on_event: OnEvent) -> Result<(), RpcError>"
        ));
        assert!(code.contains("OnEvent: FnMut(SseEvent<User>, &mut SseController),"));
        assert!(code.contains(
            ".event_stream(|body: String| User::from_json_string(body), on_event)"
        ));
        assert!(code.contains("&[\"http\", \"ws\"]"));
    }

    #[test]
    fn test_nested_service_names() {
        let code = render(json!({
            "procedures": {
                "users.settings.get": { "path": "/users/settings/get", "method": "get" }
            }
        }));
        assert!(code.contains("pub struct TestUsersSettingsService {"));
        assert!(code.contains("pub settings: TestUsersSettingsService,"));
        assert!(code.contains("pub async fn get(&self) -> Result<(), RpcError> {"));
    }
}
