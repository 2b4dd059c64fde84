//! Request construction and dispatch.

use eventsource_stream::Eventsource;
use futures::StreamExt;

use crate::sse::EventKind;
use crate::{RpcClientConfig, RpcError, SseController, SseEvent};

/// HTTP methods a procedure can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One call to a procedure.
pub struct RpcRequest<'a> {
    config: &'a RpcClientConfig,
    method: HttpMethod,
    path: String,
    query: Option<String>,
    body: Option<String>,
}

impl<'a> RpcRequest<'a> {
    pub fn new(config: &'a RpcClientConfig, method: HttpMethod, path: &str) -> Self {
        Self {
            config,
            method,
            path: path.to_string(),
            query: None,
            body: None,
        }
    }

    /// Sets the query string, without the leading `?`.
    pub fn query(mut self, query: String) -> Self {
        self.query = Some(query);
        self
    }

    /// Sets a JSON body.
    pub fn body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn url(&self) -> String {
        self.config.url(&self.path, self.query.as_deref())
    }

    fn build(self) -> reqwest::RequestBuilder {
        let url = self.url();
        let mut builder = self.config.http_client.request(self.method.into(), url);
        if let Some(version) = &self.config.client_version {
            builder = builder.header("client-version", version);
        }
        for (name, value) in self.config.headers() {
            builder = builder.header(name, value);
        }
        if let Some(body) = self.body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }
        builder
    }

    /// Sends the request and returns the response body. Non-success statuses
    /// become an [`RpcError`] decoded from the body.
    pub async fn send(self) -> Result<String, RpcError> {
        let method = self.method;
        let path = self.path.clone();
        let response = self.build().send().await?;
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            Ok(text)
        } else {
            tracing::debug!(
                ?method,
                %path,
                status = status.as_u16(),
                "procedure returned an error"
            );
            Err(RpcError::from_response(status.as_u16(), &text))
        }
    }

    /// Opens an event stream, decoding every message with `parse` and passing
    /// it to `on_event` until the server ends the stream or the callback
    /// aborts it.
    ///
    /// Connection failures are both delivered as [`SseEvent::Error`] and
    /// returned.
    pub async fn event_stream<T, P, F>(self, parse: P, mut on_event: F) -> Result<(), RpcError>
    where
        P: Fn(String) -> T,
        F: FnMut(SseEvent<T>, &mut SseController),
    {
        let mut controller = SseController::new();
        let request = self.build().header(reqwest::header::ACCEPT, "text/event-stream");

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                let err = RpcError::from(err);
                on_event(SseEvent::Error(err.clone()), &mut controller);
                return Err(err);
            }
        };
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = RpcError::from_response(status.as_u16(), &text);
            on_event(SseEvent::Error(err.clone()), &mut controller);
            return Err(err);
        }

        on_event(SseEvent::Start, &mut controller);
        if controller.is_aborted() {
            on_event(SseEvent::Cancel, &mut controller);
            return Ok(());
        }

        let mut stream = response.bytes_stream().eventsource();
        while let Some(event) = stream.next().await {
            match event {
                Ok(event) => match EventKind::from_name(&event.event) {
                    EventKind::Message => {
                        on_event(SseEvent::Data(parse(event.data)), &mut controller)
                    }
                    EventKind::Error => on_event(
                        SseEvent::Error(RpcError::from_response(0, &event.data)),
                        &mut controller,
                    ),
                    EventKind::Done => break,
                    EventKind::Heartbeat => {}
                },
                Err(err) => {
                    let err = RpcError::new(0, err.to_string());
                    on_event(SseEvent::Error(err.clone()), &mut controller);
                    return Err(err);
                }
            }
            if controller.is_aborted() {
                on_event(SseEvent::Cancel, &mut controller);
                return Ok(());
            }
        }

        on_event(SseEvent::End, &mut controller);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one connection with `response` and returns the raw request.
    async fn serve_once(response: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buffer = vec![0u8; 8192];
            let read = socket.read(&mut buffer).await.unwrap();
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&buffer[..read]).to_string()
        });
        (url, handle)
    }

    #[test]
    fn test_url_includes_query() {
        let config = RpcClientConfig::new("http://localhost");
        let request =
            RpcRequest::new(&config, HttpMethod::Get, "/users/get").query("id=1".to_string());
        assert_eq!(request.url(), "http://localhost/users/get?id=1");
    }

    #[tokio::test]
    async fn test_send_reports_error_body() {
        let (url, server) = serve_once(
            "HTTP/1.1 400 Bad Request\r\ncontent-type: application/json\r\ncontent-length: 34\r\nconnection: close\r\n\r\n{\"code\":400,\"message\":\"bad input\"}",
        )
        .await;
        let config = RpcClientConfig::new(url);
        let err = RpcRequest::new(&config, HttpMethod::Post, "/echo")
            .body("{}".to_string())
            .send()
            .await
            .unwrap_err();
        assert_eq!(err.code, 400);
        assert_eq!(err.message, "bad input");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /echo HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_event_stream_delivers_messages_then_end() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\nconnection: close\r\n\r\ndata: one\n\nevent: ping\ndata:\n\ndata: two\n\nevent: done\ndata: \n\n",
        )
        .await;
        let config = RpcClientConfig::new(url);
        let mut events = Vec::new();
        RpcRequest::new(&config, HttpMethod::Get, "/watch")
            .event_stream(|body| body, |event, _| events.push(event))
            .await
            .unwrap();
        assert_eq!(
            events,
            vec![
                SseEvent::Start,
                SseEvent::Data("one".to_string()),
                SseEvent::Data("two".to_string()),
                SseEvent::End,
            ]
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_event_stream_abort_cancels() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\nconnection: close\r\n\r\ndata: one\n\ndata: two\n\n",
        )
        .await;
        let config = RpcClientConfig::new(url);
        let mut events = Vec::new();
        RpcRequest::new(&config, HttpMethod::Get, "/watch")
            .event_stream(
                |body| body,
                |event, controller| {
                    if matches!(event, SseEvent::Data(_)) {
                        controller.abort();
                    }
                    events.push(event);
                },
            )
            .await
            .unwrap();
        assert_eq!(
            events,
            vec![SseEvent::Start, SseEvent::Data("one".to_string()), SseEvent::Cancel]
        );
        server.await.unwrap();
    }
}
