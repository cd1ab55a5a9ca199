use std::collections::{BTreeSet, HashMap};
use std::io::{Cursor, Write};
use std::sync::Arc;

use dexviewer::{
    apk::DexSection,
    config::ViewerConfig,
    dex::{
        ClassDecoder, ClassRecord, DexError, InstructionRecord, MethodRecord, MethodRef, Opcode,
        Reference,
    },
    session::{LoadKind, PackageSource, Session, Status},
};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

/// Serves canned classes per section name; sections whose bytes are `broken` fail to decode and
/// sections whose bytes are `panic` bring the decoder down
struct FakeDecoder {
    sections: HashMap<String, Vec<ClassRecord>>,
}

impl ClassDecoder for FakeDecoder {
    fn decode(&self, section: &DexSection) -> Result<Vec<ClassRecord>, DexError> {
        if section.bytes == b"panic" {
            panic!("decoder bug in {}", section.name);
        }
        if section.bytes == b"broken" {
            return Err(DexError::Malformed {
                section: section.name.clone(),
                reason: "bad magic".into(),
            });
        }
        Ok(self.sections.get(&section.name).cloned().unwrap_or_default())
    }
}

fn write_apk(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn class_a() -> ClassRecord {
    ClassRecord {
        name: "LA;".into(),
        superclass: None,
        methods: vec![MethodRecord {
            name: "run".into(),
            params: vec![],
            return_type: "V".into(),
            insns: Some(vec![InstructionRecord {
                opcode: Opcode::ReturnVoid,
                reference: None,
            }]),
        }],
    }
}

fn class_b() -> ClassRecord {
    ClassRecord {
        name: "LB;".into(),
        superclass: Some("LBase;".into()),
        methods: vec![MethodRecord {
            name: "callA".into(),
            params: vec!["I".into()],
            return_type: "V".into(),
            insns: Some(vec![
                InstructionRecord {
                    opcode: Opcode::InvokeStatic,
                    reference: Some(Reference::Method(MethodRef {
                        defining_class: "LA;".into(),
                        name: "run".into(),
                    })),
                },
                InstructionRecord {
                    opcode: Opcode::InvokeVirtual,
                    reference: Some(Reference::Method(MethodRef {
                        defining_class: "Ljava/lang/Object;".into(),
                        name: "hashCode".into(),
                    })),
                },
                InstructionRecord {
                    opcode: Opcode::ReturnVoid,
                    reference: None,
                },
            ]),
        }],
    }
}

fn session() -> Session {
    // Sections are served in reverse name order so the index has to sort
    let sections = HashMap::from([
        ("classes.dex".to_string(), vec![class_b()]),
        ("classes2.dex".to_string(), vec![class_a()]),
    ]);
    Session::new(Arc::new(FakeDecoder { sections }), ViewerConfig::default())
}

fn two_section_apk() -> Vec<u8> {
    write_apk(&[
        ("classes.dex", b"dex"),
        ("assets/readme.txt", b"not code"),
        ("classes2.dex", b"dex"),
    ])
}

#[test]
fn two_sections_are_merged_and_cross_referenced() {
    let session = session();
    let state = session
        .open_package(PackageSource::Bytes(two_section_apk()), LoadKind::Selected)
        .wait()
        .unwrap();

    assert!(!state.loading);
    assert_eq!(state.error, None);
    let names: Vec<_> = state.classes().iter().map(|c| c.class_name.as_str()).collect();
    assert_eq!(names, vec!["LA;", "LB;"]);
    assert_eq!(state.selected.as_deref(), Some("LA;"));
    assert_eq!(state.summary, "Selected package: 2 classes");

    let b = state.index.resolve_by_name("LB;").unwrap();
    assert_eq!(
        b.invoke_targets,
        BTreeSet::from(["LA;".to_string(), "Ljava/lang/Object;".to_string()])
    );
    assert!(b.lines().any(|line| line.ends_with("# LA;->run")));
    assert!(b.body.starts_with(".class LB;\n.super LBase;\n\n.method callA(I)V\n"));
}

#[test]
fn following_references_navigates_within_the_package() {
    let session = session();
    session
        .open_package(PackageSource::Bytes(two_section_apk()), LoadKind::Selected)
        .wait()
        .unwrap();
    assert!(session.select_class("LB;"));

    let state = session.snapshot();
    let b = state.selected_class().unwrap();
    let to_a = b.references[0].line;
    let to_object = b.references[1].line;

    // Calls into classes outside the package leave the selection alone
    assert_eq!(session.follow_reference(to_object), None);
    assert_eq!(session.snapshot().selected.as_deref(), Some("LB;"));

    // Lines without a call comment do nothing either
    assert_eq!(session.follow_reference(0), None);

    let followed = session.follow_reference(to_a).unwrap();
    assert_eq!(followed.name, "run");
    assert_eq!(session.snapshot().selected.as_deref(), Some("LA;"));
}

#[test]
fn selecting_an_unknown_class_is_a_no_op() {
    let session = session();
    session
        .open_package(PackageSource::Bytes(two_section_apk()), LoadKind::Selected)
        .wait()
        .unwrap();
    let before = session.snapshot();
    assert!(!session.select_class("LMissing;"));
    let after = session.snapshot();
    assert_eq!(after.selected, before.selected);
    assert_eq!(after.version, before.version);
}

#[test]
fn query_filters_by_class_and_method_name() {
    let session = session();
    session
        .open_package(PackageSource::Bytes(two_section_apk()), LoadKind::Selected)
        .wait()
        .unwrap();

    let state = session.set_query("CALLA");
    let names: Vec<_> = state.classes().iter().map(|c| c.class_name.as_str()).collect();
    assert_eq!(names, vec!["LB;"]);

    let state = session.set_query("  ");
    assert_eq!(state.classes().len(), 2);
    assert_eq!(state.status(), Status::Showing(2));

    let state = session.set_query("nothing");
    assert_eq!(state.status(), Status::NoMatches);
}

#[test]
fn invalid_archive_on_first_load_leaves_an_empty_list() {
    let session = session();
    let state = session
        .open_package(PackageSource::Bytes(b"not a zip".to_vec()), LoadKind::Selected)
        .wait()
        .unwrap();
    assert!(!state.loading);
    assert!(state.error.is_some());
    assert!(state.index.is_empty());
    assert!(matches!(state.status(), Status::Failed(_)));
}

#[test]
fn failed_load_keeps_the_previous_classes() {
    let session = session();
    session
        .open_package(PackageSource::Bytes(two_section_apk()), LoadKind::Selected)
        .wait()
        .unwrap();

    let state = session
        .open_package(PackageSource::Bytes(b"garbage".to_vec()), LoadKind::Selected)
        .wait()
        .unwrap();
    assert!(!state.loading);
    assert!(state.error.is_some());
    assert_eq!(state.index.len(), 2);

    // One undecodable section aborts the whole load
    let apk = write_apk(&[("classes.dex", b"dex"), ("classes2.dex", b"broken")]);
    let state = session
        .open_package(PackageSource::Bytes(apk), LoadKind::Selected)
        .wait()
        .unwrap();
    assert!(state.error.as_deref().unwrap().contains("classes2.dex"));
    assert_eq!(state.index.len(), 2);
    assert_eq!(state.selected.as_deref(), Some("LA;"));

    // A good load clears the error
    let state = session
        .open_package(PackageSource::Bytes(two_section_apk()), LoadKind::Selected)
        .wait()
        .unwrap();
    assert_eq!(state.error, None);
}

#[test]
fn decoder_panic_is_published_as_an_error() {
    let session = session();
    session
        .open_package(PackageSource::Bytes(two_section_apk()), LoadKind::Selected)
        .wait()
        .unwrap();

    let apk = write_apk(&[("classes.dex", b"dex"), ("classes2.dex", b"panic")]);
    let state = session
        .open_package(PackageSource::Bytes(apk), LoadKind::Selected)
        .wait()
        .unwrap();
    assert!(!state.loading);
    assert_eq!(
        state.error.as_deref(),
        Some("Load panicked: decoder bug in classes2.dex")
    );
    assert_eq!(state.index.len(), 2);
    assert_eq!(session.snapshot().version, state.version);
}

#[test]
fn package_without_dex_is_empty_not_an_error() {
    let session = session();
    let apk = write_apk(&[("res/layout/main.xml", b"<xml/>")]);
    let state = session
        .open_package(PackageSource::Bytes(apk), LoadKind::Selected)
        .wait()
        .unwrap();
    assert_eq!(state.error, None);
    assert!(state.selected.is_none());
    assert_eq!(state.status(), Status::NoClasses);
}

#[test]
fn sample_without_manifest_shows_every_class() {
    let session = session();
    let state = session
        .open_package(PackageSource::Bytes(two_section_apk()), LoadKind::Sample)
        .wait()
        .unwrap();
    assert_eq!(state.index.len(), 2);
    assert_eq!(state.summary, "Sample package: 2 classes");
}

#[test]
fn sample_with_manifest_shows_only_app_classes() {
    let main = ClassRecord {
        name: "Lcom/test/MainActivity;".into(),
        superclass: None,
        methods: vec![],
    };
    let sections = HashMap::from([("classes.dex".to_string(), vec![class_a(), main])]);
    let session = Session::new(Arc::new(FakeDecoder { sections }), ViewerConfig::default());
    let manifest = std::fs::read("tests/manifest/AndroidManifest.xml").unwrap();
    let apk = write_apk(&[
        ("AndroidManifest.xml", manifest.as_slice()),
        ("classes.dex", b"dex"),
    ]);

    let state = session
        .open_package(PackageSource::Bytes(apk.clone()), LoadKind::Sample)
        .wait()
        .unwrap();
    let names: Vec<_> = state.classes().iter().map(|c| c.class_name.as_str()).collect();
    assert_eq!(names, vec!["Lcom/test/MainActivity;"]);
    assert_eq!(state.selected.as_deref(), Some("Lcom/test/MainActivity;"));
    assert_eq!(state.summary, "Sample package: 1 app classes / 2 classes in package");

    // Picking the same package by hand shows everything
    let state = session
        .open_package(PackageSource::Bytes(apk), LoadKind::Selected)
        .wait()
        .unwrap();
    assert_eq!(state.summary, "Selected package: 2 classes");
}

#[test]
fn subscribers_see_loading_then_the_complete_state() {
    let session = session();
    let updates = session.subscribe();
    session
        .open_package(PackageSource::Bytes(two_section_apk()), LoadKind::Selected)
        .wait()
        .unwrap();

    let loading = updates.recv().unwrap();
    assert!(loading.loading);
    assert!(loading.index.is_empty());

    let loaded = updates.recv().unwrap();
    assert!(!loaded.loading);
    assert_eq!(loaded.index.len(), 2);
    assert!(loaded.version > loading.version);
}

#[test]
fn reader_sources_are_read_fully() {
    let session = session();
    let reader = Box::new(Cursor::new(two_section_apk()));
    let state = session
        .open_package(PackageSource::Reader(reader), LoadKind::Selected)
        .wait()
        .unwrap();
    assert_eq!(state.index.len(), 2);
}

#[test]
fn missing_file_is_an_io_error() {
    let session = session();
    let state = session
        .open_package(
            PackageSource::Path("/nonexistent/dexviewer/app.apk".into()),
            LoadKind::Selected,
        )
        .wait()
        .unwrap();
    assert!(state.error.as_deref().unwrap().starts_with("Failed to read package"));
}
