use std::io::Write;

use devirt_descriptor::{
    access, CallKind, ClassDescriptor, FieldType, MethodSig, ProgramDescriptor, ProgramError,
};
use pretty_assertions::assert_eq;

const PROGRAM: &str = r#"{
  "classes": [
    {
      "name": "com/example/Base",
      "super_name": "java/lang/Object",
      "methods": [
        { "name": "foo", "descriptor": "()Ljava/lang/String;", "access_flags": 1 }
      ]
    },
    {
      "name": "com/example/Intf",
      "access_flags": 1537,
      "methods": [
        { "name": "getInstance", "descriptor": "(I)Lcom/example/Intf;", "access_flags": 1025 }
      ]
    },
    {
      "name": "com/example/Impl",
      "super_name": "java/lang/Object",
      "interfaces": ["com/example/Intf"],
      "store": "secondary",
      "methods": [
        {
          "name": "getInstance",
          "descriptor": "(I)Lcom/example/Intf;",
          "access_flags": 1,
          "inferred_return": "com/example/Impl"
        }
      ]
    }
  ],
  "call_sites": [
    {
      "id": "t1",
      "owner": "com/example/Intf",
      "name": "getInstance",
      "descriptor": "(I)Lcom/example/Intf;",
      "kind": "interface"
    },
    {
      "id": "t2",
      "owner": "[Lcom/example/Base;",
      "name": "clone",
      "descriptor": "()Ljava/lang/Object;",
      "kind": "virtual"
    }
  ]
}"#;

#[test]
fn parses_program_json() {
    let program = ProgramDescriptor::from_json_str(PROGRAM).expect("program should parse");
    assert_eq!(program.classes.len(), 3);
    assert_eq!(program.call_sites.len(), 2);

    let intf = &program.classes[1];
    assert!(intf.is_interface());
    assert!(intf.is_abstract());
    assert_eq!(intf.super_name, None);
    assert!(!intf.methods[0].has_body());

    let imp = &program.classes[2];
    assert_eq!(imp.store.as_deref(), Some("secondary"));
    assert_eq!(
        imp.methods[0].inferred_return.as_deref(),
        Some("com/example/Impl")
    );

    let site = &program.call_sites[0];
    assert_eq!(site.kind, CallKind::Interface);
    assert_eq!(
        site.sig().unwrap(),
        MethodSig::new("getInstance", vec![FieldType::Base(devirt_descriptor::BaseType::Int)])
    );

    let clone = &program.call_sites[1];
    assert_eq!(
        clone.receiver().unwrap(),
        FieldType::array_of(FieldType::object("com/example/Base"))
    );
}

#[test]
fn builders_match_json_shape() {
    let program = ProgramDescriptor::from_json_str(PROGRAM).unwrap();
    let built = ClassDescriptor::interface("com/example/Intf").with_method(
        devirt_descriptor::MethodDescriptorStub::abstract_method(
            "getInstance",
            "(I)Lcom/example/Intf;",
        ),
    );
    assert_eq!(program.classes[1], built);
    assert_eq!(
        built.access_flags,
        access::ACC_PUBLIC | access::ACC_INTERFACE | access::ACC_ABSTRACT
    );
}

#[test]
fn load_from_path_reports_io_and_parse_failures() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    let err = ProgramDescriptor::load_from_path(&missing).unwrap_err();
    assert!(matches!(err, ProgramError::Io { .. }), "{err}");

    let mut file = tempfile::NamedTempFile::new_in(dir.path()).unwrap();
    file.write_all(b"{ \"classes\": 3 }").unwrap();
    let err = ProgramDescriptor::load_from_path(file.path()).unwrap_err();
    assert!(matches!(err, ProgramError::Json(_)), "{err}");

    let mut good = tempfile::NamedTempFile::new_in(dir.path()).unwrap();
    good.write_all(PROGRAM.as_bytes()).unwrap();
    let program = ProgramDescriptor::load_from_path(good.path()).unwrap();
    assert_eq!(program.classes[0].name, "com/example/Base");
}
