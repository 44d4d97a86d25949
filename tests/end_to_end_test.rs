use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use pinselflut::canvas::{stamp_point, BrushCurve, Dimensions, Rgb, Rgba, Tip};
use pinselflut::net::{Connection, ConnectionState, OutputBuffer};
use pinselflut::FlutClient;

const TIMEOUT: Duration = Duration::from_secs(5);
const FALLBACK: Dimensions = Dimensions::new(1280, 720);

/// Canvas server that answers `SIZE` with `reply` and records everything it
/// receives on one connection until the client hangs up
fn spawn_server(reply: &'static [u8]) -> (u16, thread::JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream.set_read_timeout(Some(TIMEOUT)).unwrap();
        let mut received = Vec::new();
        let mut chunk = [0u8; 4096];
        let mut answered = false;
        loop {
            let n = match stream.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            received.extend_from_slice(&chunk[..n]);
            if !answered && received.starts_with(b"SIZE\n") {
                stream.write_all(reply).unwrap();
                answered = true;
            }
        }
        received
    });
    (port, handle)
}

fn connect(port: u16) -> Connection {
    Connection::connect("127.0.0.1", port).unwrap()
}

#[test]
fn test_red_pixel_reaches_server() {
    let (port, server) = spawn_server(b"SIZE 100 50\n");
    let mut connection = connect(port);
    assert_eq!(connection.state(), ConnectionState::Connected);

    let dims = connection.query_size(FALLBACK, TIMEOUT).unwrap();
    assert_eq!(dims, Dimensions::new(100, 50));

    let mut client = FlutClient::new(connection, dims, OutputBuffer::default());
    client.append_pixel(10, 10, Rgba::new(255, 0, 0, 255)).unwrap();
    client.flush().unwrap();
    assert_eq!(client.mirror().get_pixel(10, 10), Some(Rgb::new(255, 0, 0)));
    drop(client);

    let received = server.join().unwrap();
    assert_eq!(received, b"SIZE\nPX 10 10 ff0000ff\n");
}

#[test]
fn test_malformed_size_falls_back() {
    let (port, server) = spawn_server(b"HELLO\n");
    let mut connection = connect(port);
    let dims = connection.query_size(FALLBACK, TIMEOUT).unwrap();
    assert_eq!(dims, FALLBACK);
    drop(connection);
    server.join().unwrap();
}

#[test]
fn test_off_canvas_stamp_sends_only_visible_pixels() {
    let (port, server) = spawn_server(b"SIZE 4 4\n");
    let mut connection = connect(port);
    let dims = connection.query_size(FALLBACK, TIMEOUT).unwrap();
    let mut client = FlutClient::new(connection, dims, OutputBuffer::default());

    let tip = Tip::new(1, Rgba::GREEN, BrushCurve::default());
    stamp_point(&mut client, -1, 0, &tip).unwrap();
    stamp_point(&mut client, 3, 3, &tip).unwrap();
    client.flush().unwrap();
    drop(client);

    let received = server.join().unwrap();
    assert_eq!(received, b"SIZE\nPX 3 3 00ff00ff\n");
}

#[test]
fn test_reconnect_opens_a_fresh_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = thread::spawn(move || {
        // first connection is dropped right away
        drop(listener.accept().unwrap());
        let (mut stream, _) = listener.accept().unwrap();
        stream.set_read_timeout(Some(TIMEOUT)).unwrap();
        let mut received = Vec::new();
        let _ = stream.read_to_end(&mut received);
        received
    });

    let mut connection = connect(port);
    connection.reconnect().unwrap();
    assert_eq!(connection.reconnects(), 1);

    let mut client = FlutClient::new(connection, Dimensions::new(8, 8), OutputBuffer::default());
    client.append_pixel(1, 2, Rgba::BLUE).unwrap();
    client.flush().unwrap();
    drop(client);

    assert_eq!(server.join().unwrap(), b"PX 1 2 0000ffff\n");
}
