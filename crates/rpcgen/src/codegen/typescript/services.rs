//! TypeScript client classes.

use super::ident::{field_identifier, type_identifier};
use super::models::doc_comment;
use super::property::js_string;
use crate::codegen::naming::IdentScope;
use crate::codegen::{indent, service_type_name};
use crate::ir::{IrOptions, ProcedureDecl, ServiceDecl};

/// Renders the root client class and every nested service class.
pub fn render_services(root: &ServiceDecl, options: &IrOptions) -> String {
    let mut output = String::new();
    render_service(root, options, &mut output);
    output
}

fn render_service(service: &ServiceDecl, options: &IrOptions, output: &mut String) {
    let name = type_identifier(&service_type_name(options, &service.path));

    let mut members = IdentScope::new();
    members.claim("_options".to_string(), "");
    let children: Vec<(String, String)> = service
        .services
        .iter()
        .map(|child| {
            (
                members.claim(field_identifier(&child.name), ""),
                type_identifier(&service_type_name(options, &child.path)),
            )
        })
        .collect();

    output.push_str(&format!("export class {} {{\n", name));
    output.push_str("  private readonly _options: RpcClientOptions;\n");
    for (field, type_name) in &children {
        output.push_str(&format!("  readonly {}: {};\n", field, type_name));
    }
    output.push('\n');
    output.push_str("  constructor(options: RpcClientOptions) {\n");
    output.push_str("    this._options = options;\n");
    for (field, type_name) in &children {
        output.push_str(&format!("    this.{} = new {}(options);\n", field, type_name));
    }
    output.push_str("  }\n");

    for procedure in &service.procedures {
        let ident = members.claim(field_identifier(&procedure.name), "");
        output.push('\n');
        output.push_str(&indent::block(&render_procedure(procedure, &ident), 2));
        output.push('\n');
    }
    output.push_str("}\n");

    for child in &service.services {
        output.push('\n');
        render_service(child, options, output);
    }
}

fn render_procedure(procedure: &ProcedureDecl, ident: &str) -> String {
    let mut output = doc_comment(procedure.description.as_deref(), procedure.is_deprecated);

    let params = procedure.params.as_ref().map(|p| type_identifier(&p.name));
    let response = procedure.response.as_ref().map(|r| type_identifier(&r.name));
    let params_type = params.clone().unwrap_or_else(|| "undefined".to_string());
    let response_type = response.clone().unwrap_or_else(|| "undefined".to_string());

    let serializer = match &params {
        Some(params) if procedure.method.uses_query_string() => {
            format!("$${}.toUrlQueryString", params)
        }
        Some(params) => format!("$${}.toJsonString", params),
        None => "() => \"\"".to_string(),
    };
    let parser = match &response {
        Some(response) => format!("$${}.fromJsonString", response),
        None => "() => undefined".to_string(),
    };
    let request = format!(
        "{{\n    procedure: {},\n    method: {},\n    path: {},\n    params: {},\n    serializer: {},\n    parser: {},\n}}",
        js_string(&procedure.full_name),
        js_string(procedure.method.as_str()),
        js_string(&procedure.path),
        if params.is_some() { "params" } else { "undefined" },
        serializer,
        parser
    );
    let transports = procedure
        .transports
        .iter()
        .map(|t| js_string(t))
        .collect::<Vec<_>>()
        .join(", ");
    let assert = format!(
        "    assertTransport(this._options, {}, [{}]);\n",
        js_string(&procedure.full_name),
        transports
    );

    let mut args = Vec::new();
    if let Some(params) = &params {
        args.push(format!("params: {}", params));
    }

    if procedure.is_event_stream {
        args.push(format!("options: SseOptions<{}> = {{}}", response_type));
        output.push_str(&format!("{}({}): EventSourceController {{\n", ident, args.join(", ")));
        output.push_str(&assert);
        output.push_str(&format!(
            "    return rpcEventStream<{}, {}>(\n        this._options,\n{},\n        options,\n    );\n",
            params_type,
            response_type,
            indent::block(&request, 8)
        ));
    } else {
        let returns = response.clone().unwrap_or_else(|| "void".to_string());
        output.push_str(&format!(
            "async {}({}): Promise<{}> {{\n",
            ident,
            args.join(", "),
            returns
        ));
        output.push_str(&assert);
        output.push_str(&format!(
            "    return rpcRequest<{}, {}>(this._options, {});\n",
            params_type,
            response_type,
            indent::tail(&request, 4)
        ));
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

    #[test]
    fn test_get_request() {
        let code = render(json!({
            "procedures": {
                "users.getUser": {
                    "path": "/users/get-user",
                    "method": "get",
                    "params": "UserParams",
                    "response": "User"
                }
            },
            "definitions": {
                "UserParams": { "properties": { "userId": { "type": "string" } } },
                "User": { "properties": { "id": { "type": "string" } } }
            }
        }));
        assert!(code.contains("export class TestClient {"));
        assert!(code.contains("  readonly users: TestUsersService;"));
        assert!(code.contains("    this.users = new TestUsersService(options);"));
        assert!(code.contains("async getUser(params: UserParams): Promise<User> {"));
        assert!(code.contains("assertTransport(this._options, \"users.getUser\", [\"http\"]);"));
        assert!(code.contains("method: \"get\","));
        assert!(code.contains("serializer: $$UserParams.toUrlQueryString,"));
        assert!(code.contains("parser: $$User.fromJsonString,"));
    }

    #[test]
    fn test_post_without_response() {
        let code = render(json!({
            "procedures": { "ping": { "path": "/ping", "method": "post" } }
        }));
        assert!(code.contains("async ping(): Promise<void> {"));
        assert!(code.contains("params: undefined,"));
        assert!(code.contains("serializer: () => \"\","));
        assert!(code.contains("parser: () => undefined,"));
    }

    #[test]
    fn test_event_stream() {
        let code = render(json!({
            "procedures": {
                "watch": {
                    "path": "/watch",
                    "method": "post",
                    "params": "Filter",
                    "response": "Event",
                    "isEventStream": true
                }
            },
            "definitions": {
                "Filter": { "properties": {} },
                "Event": { "properties": {} }
            }
        }));
        assert!(code.contains(
            "watch(params: Filter, options: SseOptions<Event> = {}): EventSourceController {"
        ));
        assert!(code.contains("return rpcEventStream<Filter, Event>("));
        assert!(code.contains("serializer: $$Filter.toJsonString,"));
    }

    #[test]
    fn test_method_named_constructor_is_escaped() {
        let code = render(json!({
            "procedures": { "constructor": { "path": "/constructor", "method": "post" } }
        }));
        assert!(code.contains("async constructor_(): Promise<void> {"));
    }
}
