use std::time::Duration;

use http::{HeaderName, HeaderValue};
use http::header::CONTENT_TYPE;
use micro_transport::codec::Parser;
use micro_transport::connection::{Connection, Lifecycle, receive, send};
use micro_transport::protocol::{HttpError, HttpMessage};
use tokio::net::{TcpListener, TcpStream};

use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!(port = 8080, "start listening");
    let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
        Ok(tcp_listener) => tcp_listener,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return;
        }
    };

    loop {
        let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
            Ok(stream_and_addr) => stream_and_addr,
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                continue;
            }
        };

        tokio::spawn(async move {
            match serve(tcp_stream).await {
                Ok(served) => info!(%remote_addr, served, "connection closed"),
                Err(e) => info!(%remote_addr, cause = %e, "connection shutdown"),
            }
        });
    }
}

/// Echoes every request body back, with the decoded fields as headers.
async fn serve(stream: TcpStream) -> Result<usize, HttpError> {
    let mut connection = Connection::new(stream);
    let mut parser = Parser::request();
    let mut request = HttpMessage::request();
    let mut served = 0;

    loop {
        connection.start_timer(IDLE_TIMEOUT);
        let received = receive(&mut connection, &mut parser, &mut request).await;
        connection.cancel_timer();
        received?;

        let mut response = HttpMessage::response_for(&request);
        for (name, value) in request.params().iter() {
            info!(name, value, "request field");
            if let Ok(field) = HeaderValue::from_str(&format!("{name}={value}")) {
                response.add_header(HeaderName::from_static("x-field"), field);
            }
        }
        if let Some(content_type) = request.header(CONTENT_TYPE.as_str()) {
            response.set_header(CONTENT_TYPE, content_type.clone());
        }
        response.set_content(request.content());

        connection.start_timer(IDLE_TIMEOUT);
        let sent = send(&mut connection, &mut response, false).await;
        connection.cancel_timer();
        sent?;
        served += 1;

        if connection.lifecycle() == Lifecycle::Close {
            return Ok(served);
        }
    }
}
