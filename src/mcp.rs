use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::format;
use crate::host::{NavigationMessage, PanelView, RenderTarget, TocEvent, TocPanel};
use crate::outline::{OutlineBuilder, Toc};
use crate::read::{self, FileSource};
use crate::render;

/// MCP server over stdio. Four tools:
/// - `toc_outline`  → one-shot outline of a file or inline text
/// - `toc_select`   → select a note (selection changed)
/// - `toc_refresh`  → re-read the selected note (content changed)
/// - `toc_navigate` → resolve a clicked slug to a line
pub fn run(config: Config) -> io::Result<()> {
    let server = Server::new(config);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }

        let req: JsonRpcRequest = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                write_error(&mut stdout, None, -32700, &format!("parse error: {e}"))?;
                continue;
            }
        };

        // Notifications have no id — silently drop them per JSON-RPC spec
        if req.id.is_none() {
            continue;
        }

        let response = server.handle_request(&req);
        serde_json::to_writer(&mut stdout, &response)?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
    }

    Ok(())
}

#[derive(Deserialize)]
struct JsonRpcRequest {
    #[serde(rename = "jsonrpc")]
    _jsonrpc: String,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Serialize)]
struct JsonRpcResponse {
    jsonrpc: &'static str,
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

/// Keeps the last view the panel produced so tool calls can return it.
#[derive(Default)]
struct LastView(Mutex<Option<PanelView>>);

impl RenderTarget for LastView {
    fn render(&self, view: &PanelView) {
        let mut slot = match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = Some(view.clone());
    }
}

impl LastView {
    fn get(&self) -> Option<PanelView> {
        match self.0.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

struct Server {
    config: Config,
    panel: TocPanel<FileSource, LastView>,
}

impl Server {
    fn new(config: Config) -> Self {
        Self {
            config,
            panel: TocPanel::new(FileSource::default(), LastView::default()),
        }
    }

    fn handle_request(&self, req: &JsonRpcRequest) -> JsonRpcResponse {
        match req.method.as_str() {
            "initialize" => ok(
                req,
                serde_json::json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {
                        "tools": {}
                    },
                    "serverInfo": {
                        "name": "notetoc",
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            ),

            "tools/list" => ok(req, serde_json::json!({ "tools": tool_definitions() })),

            "tools/call" => self.handle_tool_call(req),

            "ping" => ok(req, serde_json::json!({})),

            _ => JsonRpcResponse {
                jsonrpc: "2.0",
                id: req.id.clone(),
                result: None,
                error: Some(JsonRpcError {
                    code: -32601,
                    message: format!("method not found: {}", req.method),
                }),
            },
        }
    }

    // -----------------------------------------------------------------------
    // Tool dispatch
    // -----------------------------------------------------------------------

    fn dispatch_tool(&self, tool: &str, args: &Value) -> Result<String, String> {
        match tool {
            "toc_outline" => self.tool_outline(args),
            "toc_select" => self.tool_select(args),
            "toc_refresh" => self.tool_refresh(args),
            "toc_navigate" => self.tool_navigate(args),
            _ => Err(format!("unknown tool: {tool}")),
        }
    }

    fn tool_outline(&self, args: &Value) -> Result<String, String> {
        let body = match (
            args.get("text").and_then(|v| v.as_str()),
            args.get("path").and_then(|v| v.as_str()),
        ) {
            (Some(text), _) => text.to_string(),
            (None, Some(path)) => {
                read::read_document(&PathBuf::from(path)).map_err(|e| e.to_string())?
            }
            (None, None) => return Err("missing required parameter: path or text".into()),
        };
        let toc = Toc::from_document(Some(body.as_str()), &mut OutlineBuilder::new());
        self.present(&toc, args)
    }

    fn tool_select(&self, args: &Value) -> Result<String, String> {
        match args.get("path").and_then(|v| v.as_str()) {
            Some(path) => self.panel.source().select(PathBuf::from(path)),
            None => self.panel.source().clear(),
        }
        self.run_pass(TocEvent::SelectionChanged, args)
    }

    fn tool_refresh(&self, args: &Value) -> Result<String, String> {
        self.run_pass(TocEvent::ContentChanged, args)
    }

    fn tool_navigate(&self, args: &Value) -> Result<String, String> {
        let slug = args
            .get("slug")
            .and_then(|v| v.as_str())
            .ok_or("missing required parameter: slug")?;
        let msg = NavigationMessage::scroll_to(slug);
        Ok(match self.panel.navigate(&msg) {
            Some(target) => format!("line {}", target.line),
            None => format!("no header with slug {slug:?}; nothing to scroll"),
        })
    }

    fn run_pass(&self, event: TocEvent, args: &Value) -> Result<String, String> {
        if self.panel.handle(event).is_none() {
            return Err("document could not be read; panel unchanged".into());
        }
        match self.panel.target().get() {
            Some(PanelView::Toc(toc)) => self.present(&toc, args),
            Some(PanelView::Loading) | None => Ok(render::render_loading(&self.config)),
        }
    }

    fn present(&self, toc: &Toc, args: &Value) -> Result<String, String> {
        let fmt = args.get("format").and_then(|v| v.as_str()).unwrap_or("text");
        match fmt {
            "text" => Ok(format::render_text(toc, &self.config)),
            "html" => Ok(render::render_html(toc, &self.config)),
            "json" => Ok(format::render_json(toc)),
            _ => Err(format!("unknown format: {fmt}. Use: text, html, json")),
        }
    }

    // -----------------------------------------------------------------------
    // MCP tool call handler
    // -----------------------------------------------------------------------

    fn handle_tool_call(&self, req: &JsonRpcRequest) -> JsonRpcResponse {
        let params = &req.params;
        let tool_name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
        let args = params.get("arguments").unwrap_or(&Value::Null);

        match self.dispatch_tool(tool_name, args) {
            Ok(output) => ok(
                req,
                serde_json::json!({
                    "content": [{
                        "type": "text",
                        "text": output
                    }]
                }),
            ),
            Err(e) => ok(
                req,
                serde_json::json!({
                    "content": [{
                        "type": "text",
                        "text": e
                    }],
                    "isError": true
                }),
            ),
        }
    }
}

fn ok(req: &JsonRpcRequest, result: Value) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0",
        id: req.id.clone(),
        result: Some(result),
        error: None,
    }
}

// ---------------------------------------------------------------------------
// Tool definitions
// ---------------------------------------------------------------------------

fn format_schema() -> Value {
    serde_json::json!({
        "type": "string",
        "enum": ["text", "html", "json"],
        "default": "text",
        "description": "Output format. html is the escaped panel markup."
    })
}

fn tool_definitions() -> Vec<Value> {
    vec![
        serde_json::json!({
            "name": "toc_outline",
            "description": "Table of contents of a Markdown note. Each header gets a unique slug; repeated headers get -2, -3 suffixes in document order.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Note to outline."
                    },
                    "text": {
                        "type": "string",
                        "description": "Inline note body. Takes precedence over path."
                    },
                    "format": format_schema()
                }
            }
        }),
        serde_json::json!({
            "name": "toc_select",
            "description": "Select the note shown in the panel and return its outline. Omit path to clear the selection.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Note to select."
                    },
                    "format": format_schema()
                }
            }
        }),
        serde_json::json!({
            "name": "toc_refresh",
            "description": "Re-read the selected note after its content changed and return the new outline.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "format": format_schema()
                }
            }
        }),
        serde_json::json!({
            "name": "toc_navigate",
            "description": "Resolve a clicked header slug to the line to scroll to. Unknown slugs are a no-op.",
            "inputSchema": {
                "type": "object",
                "required": ["slug"],
                "properties": {
                    "slug": {
                        "type": "string",
                        "description": "Slug from the panel's data-slug attribute."
                    }
                }
            }
        }),
    ]
}

fn write_error(w: &mut impl Write, id: Option<Value>, code: i32, msg: &str) -> io::Result<()> {
    let resp = JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        result: None,
        error: Some(JsonRpcError {
            code,
            message: msg.into(),
        }),
    };
    serde_json::to_writer(&mut *w, &resp)?;
    w.write_all(b"\n")?;
    w.flush()
}
