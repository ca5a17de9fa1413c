use pretty_assertions::assert_eq;
use source_augment::{
    AugmentConfig, AugmentError, AugmentStatus, Augmenter, CollectingSink, NullSink,
    UNCLASSIFIABLE_MARKER,
};
use stack_model::{Args, Call, Goroutine};
use std::path::Path;
use std::sync::Arc;

const MAIN_SOURCE: &str = "package main

func bar(s string, i int) {
\tpanic(s)
}

func foo(s string) {
\tbar(s, 1)
}

func main() {
\tfoo(\"ooh\")
}
";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Goroutine 1 of the `panic: ooh` crash of `MAIN_SOURCE`
fn main_crash(path: &str) -> Vec<Goroutine> {
    vec![Goroutine::new(
        1,
        vec![
            Call::new(path, 4, "main.bar", &[0x43080, 0x3, 0x1]),
            Call::new(path, 8, "main.foo", &[0x43080, 0x3]),
            Call::new(path, 12, "main.main", &[]),
        ],
    )]
}

fn processed(goroutines: &[Goroutine]) -> Vec<Vec<String>> {
    goroutines[0]
        .stack
        .iter()
        .map(|c| c.args.processed.clone())
        .collect()
}

#[test]
fn augments_main_crash_from_disk() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("main.go");
    std::fs::write(&path, MAIN_SOURCE).unwrap();
    let path = path.to_str().unwrap();

    let sink = Arc::new(CollectingSink::new());
    let augmenter = Augmenter::with_sink(AugmentConfig::default(), sink.clone()).unwrap();
    let mut goroutines = main_crash(path);
    let summary = augmenter.augment(&mut goroutines);

    assert_eq!(
        processed(&goroutines),
        vec![
            vec!["string(0x43080, 3)".to_string(), "1".to_string()],
            vec!["string(0x43080, 3)".to_string()],
            vec![],
        ]
    );
    assert_eq!(summary.calls, 3);
    assert_eq!(summary.decoded, 3);
    assert!(sink.is_empty());

    // Raw words are left as printed.
    assert_eq!(goroutines[0].stack[1].args.values, Args::from_words(&[0x43080, 0x3]).values);

    let stats = augmenter.cache().stats();
    assert_eq!(stats.reads, 1);
    assert_eq!(stats.parses, 1);
}

#[test]
fn augmenting_twice_is_idempotent_and_cached() {
    let augmenter = Augmenter::with_sink(AugmentConfig::default(), Arc::new(NullSink)).unwrap();
    augmenter.cache().insert_source("/root/main.go", MAIN_SOURCE);

    let mut call = Call::new("/root/main.go", 8, "main.foo", &[0x43080, 0x3]);
    assert_eq!(augmenter.augment_call(&mut call), AugmentStatus::Decoded);
    let first = call.args.processed.clone();
    let stats = augmenter.cache().stats();

    assert_eq!(augmenter.augment_call(&mut call), AugmentStatus::Decoded);
    assert_eq!(call.args.processed, first);
    assert_eq!(augmenter.cache().stats(), stats);
}

#[test]
fn foreign_frames_are_never_read() {
    let augmenter = Augmenter::with_sink(AugmentConfig::default(), Arc::new(NullSink)).unwrap();
    let mut goroutines = vec![Goroutine::new(
        7,
        vec![
            Call::new("/usr/local/go/src/runtime/asm_amd64.s", 1581, "runtime.goexit", &[]),
            Call::new("/root/cgo/helper.c", 12, "helper", &[0x1, 0x2]),
        ],
    )];

    let summary = augmenter.augment(&mut goroutines);
    assert_eq!(summary.foreign, 2);
    assert!(goroutines[0].stack.iter().all(|c| c.args.processed.is_empty()));
    assert_eq!(augmenter.cache().stats().reads, 0);
}

#[test]
fn unusable_file_is_never_retried() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.go");
    std::fs::write(&path, "package main\n\nfunc main( {\n").unwrap();
    let path_str = path.to_str().unwrap();

    let sink = Arc::new(CollectingSink::new());
    let augmenter = Augmenter::with_sink(AugmentConfig::default(), sink.clone()).unwrap();

    let mut first = Call::new(path_str, 3, "main.main", &[]);
    let mut second = Call::new(path_str, 3, "main.main", &[]);
    assert_eq!(augmenter.augment_call(&mut first), AugmentStatus::Unavailable);

    // Fixing the file on disk does not matter for the rest of the run.
    std::fs::write(&path, MAIN_SOURCE).unwrap();
    assert_eq!(augmenter.augment_call(&mut second), AugmentStatus::Unavailable);

    let stats = augmenter.cache().stats();
    assert_eq!(stats.reads, 1);
    assert_eq!(stats.parses, 1);
    assert!(augmenter.cache().is_unusable(Path::new(path_str)));

    let diagnostics = sink.take();
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(diagnostics[0].error, AugmentError::Parse { .. }));
}

#[test]
fn failures_do_not_stop_the_batch() {
    let source = "package main

func closure(s string) {
\tf := func() {
\t\tsink(s)
\t}
\tf()
}

func slice(b []byte) {
\tsink(b)
}

func ok(n int64) {
\tsink(n)
}
";
    let sink = Arc::new(CollectingSink::new());
    let augmenter = Augmenter::with_sink(AugmentConfig::default(), sink.clone()).unwrap();
    augmenter.cache().insert_source("/root/mixed.go", source);

    let mut goroutines = vec![Goroutine::new(
        1,
        vec![
            Call::new("/root/mixed.go", 5, "main.closure.func1", &[0x43080, 0x3]),
            Call::new("/root/mixed.go", 11, "main.slice", &[0xc000010000, 0x3, 0x8]),
            Call::new("/root/mixed.go", 15, "main.ok", &[0x2a]),
        ],
    )];
    let summary = augmenter.augment(&mut goroutines);

    assert_eq!(summary.partial, 2);
    assert_eq!(summary.decoded, 1);
    assert_eq!(
        processed(&goroutines),
        vec![
            vec![UNCLASSIFIABLE_MARKER.to_string()],
            vec![],
            vec!["42".to_string()],
        ]
    );

    let diagnostics = sink.take();
    assert_eq!(diagnostics.len(), 2);
    assert!(matches!(diagnostics[0].error, AugmentError::Unclassifiable { .. }));
    assert!(matches!(diagnostics[1].error, AugmentError::UnsupportedType { .. }));
}

#[test]
fn shared_cache_parses_each_file_once() {
    let augmenter = Augmenter::with_sink(AugmentConfig::default(), Arc::new(NullSink)).unwrap();
    augmenter.cache().insert_source("/root/main.go", MAIN_SOURCE);

    let results: Vec<Vec<Vec<String>>> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let mut goroutines = main_crash("/root/main.go");
                    augmenter.augment(&mut goroutines);
                    processed(&goroutines)
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    for result in &results {
        assert_eq!(result, &results[0]);
    }
    assert_eq!(results[0][1], vec!["string(0x43080, 3)".to_string()]);
    assert_eq!(augmenter.cache().stats().parses, 1);
}

#[test]
fn augments_parser_json_payload() {
    let json = r#"[{
        "id": 1,
        "stack": [
            { "source_path": "/root/main.go", "line": 8, "func": "main.foo",
              "args": { "values": [{ "value": 274560 }, { "value": 3 }] } }
        ]
    }]"#;
    let mut goroutines: Vec<Goroutine> = serde_json::from_str(json).unwrap();

    let augmenter = Augmenter::with_sink(AugmentConfig::default(), Arc::new(NullSink)).unwrap();
    augmenter.cache().insert_source("/root/main.go", MAIN_SOURCE);
    augmenter.augment(&mut goroutines);

    assert_eq!(
        goroutines[0].stack[0].args.processed,
        vec!["string(0x43080, 3)".to_string()]
    );
}
