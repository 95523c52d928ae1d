//! File contents tests.

mod common;

use std::io::Cursor;

use common::*;
use ros_script::Value;
use ros_util::{FileData, Response, ResponseCollection, SessionError};

fn file_entry(size: &str) -> ResponseCollection {
    ResponseCollection::new(vec![
        Response::data()
            .with_property(".id", "*1")
            .with_property("size", size),
        Response::done(),
    ])
}

/// A `/file` menu holding no file until it is created.
fn empty_file_menu(reported_size: impl Into<String>) -> MockConnection {
    let reported_size = reported_size.into();
    let mut created = false;
    MockConnection::new(move |request| match request.command() {
        "/file/print" if request.argument("file").is_some() => {
            created = true;
            done()
        }
        "/file/print" if created => file_entry(&reported_size),
        _ => done(),
    })
}

#[test]
fn test_put_creates_and_verifies() {
    let mut util = util(empty_file_menu("5"));
    assert!(util
        .file_put_contents("notes.txt", Some("hello".into()), false)
        .unwrap());

    assert_eq!(
        util.connection().commands(),
        vec!["/file/print", "/file/print", "/file/set", "/file/set", "/file/print"]
    );
    assert_eq!(
        util.connection().streamed,
        vec![("/file/set".to_string(), "contents".to_string())]
    );
    let sets: Vec<_> = util
        .connection()
        .sent
        .iter()
        .filter(|r| r.command() == "/file/set")
        .collect();
    assert_eq!(sets[0].argument("contents"), Some(&Value::text("")));
    assert_eq!(sets[1].argument("contents"), Some(&Value::text("hello")));
    assert_eq!(arg_text(sets[1], "numbers"), Some("notes.txt"));

    let create = &util.connection().sent[1];
    assert_eq!(arg_text(create, "file"), Some("notes.txt"));
    let verify = util.connection().last("/file/print").unwrap();
    assert_eq!(arg_text(verify, ".proplist"), Some("size"));
}

#[test]
fn test_put_size_mismatch_fails() {
    let mut util = util(empty_file_menu("3"));
    assert!(!util
        .file_put_contents("notes.txt", Some("hello".into()), false)
        .unwrap());
}

#[test]
fn test_put_refuses_existing_without_overwrite() {
    let mut util = util(MockConnection::new(|_| file_entry("5")));
    assert!(!util
        .file_put_contents("notes.txt", Some("hello".into()), false)
        .unwrap());
    assert_eq!(util.connection().sent.len(), 1);

    let mut util = common::util(MockConnection::new(|_| file_entry("5")));
    assert!(util
        .file_put_contents("notes.txt", Some("hello".into()), true)
        .unwrap());
}

#[test]
fn test_put_create_error_fails() {
    let mut util = util(MockConnection::new(|request| {
        if request.argument("file").is_some() {
            trap("failure: bad file name")
        } else {
            done()
        }
    }));
    assert!(!util
        .file_put_contents("bad/", Some("x".into()), false)
        .unwrap());
    assert_eq!(util.connection().count("/file/set"), 0);
}

#[test]
fn test_put_stream_is_rewound() {
    let mut util = util(empty_file_menu("4"));
    let mut stream = Cursor::new(b"skipbody".to_vec());
    stream.set_position(4);
    assert!(util
        .file_put_contents("body.bin", Some(FileData::Stream(&mut stream)), false)
        .unwrap());
    assert_eq!(stream.position(), 4);
    let set = util.connection().last("/file/set").unwrap();
    assert_eq!(set.argument("contents"), Some(&Value::text("body")));
}

#[test]
fn test_put_large_stream_is_passed_through() {
    let size = MOCK_READ_SIZE * 3 + 17;
    let mut util = util(empty_file_menu(size.to_string()));
    let mut stream = Cursor::new(vec![0xA5u8; size]);
    assert!(util
        .file_put_contents("blob.bin", Some(FileData::Stream(&mut stream)), false)
        .unwrap());
    assert_eq!(stream.position(), 0);
    assert_eq!(util.connection().streamed.len(), 1);
    let set = util.connection().last("/file/set").unwrap();
    assert_eq!(
        set.argument("contents").and_then(Value::as_bytes).map(<[u8]>::len),
        Some(size)
    );
}

#[test]
fn test_put_stream_rewound_when_transport_fails() {
    let mut created = false;
    let mut util = util(MockConnection::fallible(move |request| match request.command() {
        "/file/print" if request.argument("file").is_some() => {
            created = true;
            Ok(done())
        }
        "/file/print" if created => Ok(file_entry("4")),
        "/file/set" if request.argument("contents") != Some(&Value::text("")) => {
            Err(SessionError::transport("connection reset"))
        }
        _ => Ok(done()),
    }));
    let mut stream = Cursor::new(b"skipbody".to_vec());
    stream.set_position(4);
    let err = util
        .file_put_contents("body.bin", Some(FileData::Stream(&mut stream)), false)
        .unwrap_err();
    assert!(matches!(err, SessionError::Transport(_)));
    assert_eq!(stream.position(), 4);
}

#[test]
fn test_delete() {
    let mut prints = 0;
    let mut util = util(MockConnection::new(move |request| match request.command() {
        "/file/print" => {
            prints += 1;
            if prints == 1 {
                file_entry("5")
            } else {
                done()
            }
        }
        _ => done(),
    }));
    assert!(util.file_put_contents("notes.txt", None, false).unwrap());
    assert_eq!(
        util.connection().commands(),
        vec!["/file/print", "/file/remove", "/file/print"]
    );
    let remove = util.connection().last("/file/remove").unwrap();
    assert_eq!(arg_text(remove, "numbers"), Some("notes.txt"));
}

#[test]
fn test_delete_missing_is_false() {
    let mut util = util(MockConnection::new(|_| done()));
    assert!(!util.file_put_contents("notes.txt", None, false).unwrap());
    assert_eq!(util.connection().sent.len(), 1);
}

#[test]
fn test_get_contents_through_script() {
    let mut util = util(MockConnection::new(|request| match request.command() {
        "/file/print" => file_entry("11"),
        "/system/script/print" => ResponseCollection::new(vec![
            Response::data().with_property("source", "hello world"),
            Response::done(),
        ]),
        _ => done(),
    }));
    util.set_path("/ip/address");

    let contents = util.file_get_contents("notes.txt", Some("reader")).unwrap();
    assert_eq!(contents.as_deref(), Some(&b"hello world"[..]));
    assert_eq!(
        util.connection().commands(),
        vec![
            "/file/print",
            "/system/script/add",
            "/system/script/run",
            "/system/script/print",
            "/system/script/remove",
        ]
    );

    let add = util.connection().last("/system/script/add").unwrap();
    let source = String::from_utf8(add.argument("source").and_then(Value::as_bytes).unwrap().to_vec()).unwrap();
    assert!(source.starts_with("/ip address\n:local \"filename\" \"notes\\2Etxt\";\n"));
    assert!(source.contains("[/file get $filename contents]"));
    let print = util.connection().last("/system/script/print").unwrap();
    assert_eq!(arg_text(print, ".proplist"), Some("source"));
}

#[test]
fn test_get_binary_contents() {
    let contents = vec![0x00, 0xFF, 0xFE, b'\n', 0x80];
    let reply = contents.clone();
    let mut util = util(MockConnection::new(move |request| match request.command() {
        "/file/print" => file_entry("5"),
        "/system/script/print" => ResponseCollection::new(vec![
            Response::data().with_property("source", reply.clone()),
            Response::done(),
        ]),
        _ => done(),
    }));

    assert_eq!(
        util.file_get_contents("firmware.bin", None).unwrap(),
        Some(contents)
    );
}

#[test]
fn test_get_missing_file() {
    let mut util = util(MockConnection::new(|_| done()));
    assert_eq!(util.file_get_contents("missing.txt", None).unwrap(), None);
    assert_eq!(util.connection().sent.len(), 1);
}
