//! A scripted stand-in for the lobby server.
//!
//! The server accepts one connection and walks through a list of steps:
//! read a request frame, check its message type, write a canned reply.
//! It hands back every request it read so tests can inspect them.

#![allow(dead_code)]

use std::time::Duration;

use pokerlobby::protocol::{decode_header, encode};
use pokerlobby::transport::{frame_reader, read_frame};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// One request/reply pair the server expects.
pub struct Step {
    pub expect: u16,
    pub reply: Vec<u8>,
}

pub fn step(expect: u16, reply: Vec<u8>) -> Step {
    Step { expect, reply }
}

/// Builds a reply frame with protocol version 1.
pub fn reply<T: Serialize>(message_type: u16, payload: Option<&T>) -> Vec<u8> {
    encode(1, message_type, payload).expect("reply should encode")
}

/// A reply with a bare header.
pub fn bare(message_type: u16) -> Vec<u8> {
    reply::<()>(message_type, None)
}

/// Binds on a random port and runs `steps` against the first client.
///
/// Returns the port and a handle resolving to the requests received.
pub async fn scripted_server(steps: Vec<Step>) -> (u16, JoinHandle<Vec<Vec<u8>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("should bind");
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.expect("should accept");
        let (read, mut write) = socket.into_split();
        let mut frames = frame_reader(read);
        let mut received = Vec::new();
        for step in steps {
            let request = read_frame(&mut frames).await.expect("request frame");
            let header = decode_header(&request).expect("valid request header");
            assert_eq!(
                header.message_type.code(),
                step.expect,
                "server got an unexpected request type"
            );
            write.write_all(&step.reply).await.expect("reply should send");
            received.push(request);
        }
        // Give the client a moment to read the last reply before the
        // socket closes.
        tokio::time::sleep(Duration::from_millis(20)).await;
        received
    });

    (port, handle)
}

/// An echo server: replies to each frame with the same bytes after `delay`.
pub async fn echo_server(delay: Duration) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("should bind");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.expect("should accept");
        let (read, mut write) = socket.into_split();
        let mut frames = frame_reader(read);
        while let Ok(frame) = read_frame(&mut frames).await {
            tokio::time::sleep(delay).await;
            if write.write_all(&frame).await.is_err() {
                break;
            }
        }
    });

    port
}

/// A server that reads requests and never answers.
pub async fn silent_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("should bind");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.expect("should accept");
        let mut frames = frame_reader(socket);
        while read_frame(&mut frames).await.is_ok() {}
    });

    port
}
