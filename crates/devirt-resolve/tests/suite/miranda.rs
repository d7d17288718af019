use devirt_descriptor::{CallKind, ClassDescriptor, MethodDescriptorStub as M};
use devirt_resolve::{Resolution, UnresolvedReference};
use pretty_assertions::assert_eq;

use super::{class, context, sig, target, OBJECT};

#[test]
fn abstract_class_without_declaration_resolves_to_its_only_implementation() {
    let ctx = context(&[
        ClassDescriptor::interface("t/Concept")
            .with_method(M::abstract_method("getReal", "()Lt/Concept;")),
        ClassDescriptor::class("t/Incomplete", OBJECT)
            .with_abstract()
            .implements("t/Concept"),
        ClassDescriptor::class("t/Complete", "t/Incomplete")
            .with_method(M::concrete("getReal", "()Lt/Complete;")),
    ]);
    let get_real = sig("getReal", "()Lt/Concept;");

    for static_type in ["t/Incomplete", "t/Concept", "t/Complete"] {
        let resolved = ctx.resolve(class(&ctx, static_type), &get_real, CallKind::Virtual);
        assert_eq!(
            target(&ctx, &resolved).as_deref(),
            Some("t/Complete.getReal()"),
            "{static_type}"
        );
    }
}

#[test]
fn interface_method_inherited_from_an_unrelated_superclass() {
    let ctx = context(&[
        ClassDescriptor::interface("t/Crazy").with_method(M::abstract_method("rant", "()V")),
        ClassDescriptor::class("t/MadMan", OBJECT).with_method(M::concrete("rant", "()V")),
        ClassDescriptor::class("t/MadWoman", "t/MadMan").implements("t/Crazy"),
    ]);
    let rant = sig("rant", "()V");

    let through_impl = ctx.resolve(class(&ctx, "t/MadWoman"), &rant, CallKind::Virtual);
    assert_eq!(target(&ctx, &through_impl).as_deref(), Some("t/MadMan.rant()"));

    let through_iface = ctx.resolve(class(&ctx, "t/Crazy"), &rant, CallKind::Interface);
    assert_eq!(target(&ctx, &through_iface).as_deref(), Some("t/MadMan.rant()"));
}

#[test]
fn one_body_satisfies_two_interfaces() {
    let ctx = context(&[
        ClassDescriptor::interface("t/Crazy").with_method(M::abstract_method("act", "()V")),
        ClassDescriptor::interface("t/Mad").with_method(M::abstract_method("act", "()V")),
        ClassDescriptor::class("t/CrazyPerson", OBJECT)
            .implements("t/Crazy")
            .implements("t/Mad")
            .with_method(M::concrete("act", "()V")),
    ]);
    let act = sig("act", "()V");

    for static_type in ["t/Crazy", "t/Mad", "t/CrazyPerson"] {
        let resolved = ctx.resolve(class(&ctx, static_type), &act, CallKind::Interface);
        assert_eq!(
            target(&ctx, &resolved).as_deref(),
            Some("t/CrazyPerson.act()"),
            "{static_type}"
        );
    }
}

#[test]
fn inherited_body_serves_both_unrelated_interfaces() {
    let ctx = context(&[
        ClassDescriptor::interface("t/Crazy").with_method(M::abstract_method("act", "()V")),
        ClassDescriptor::interface("t/Mad").with_method(M::abstract_method("act", "()V")),
        ClassDescriptor::class("t/MadMan", OBJECT).with_method(M::concrete("act", "()V")),
        // No override of its own.
        ClassDescriptor::class("t/MadWoman", "t/MadMan")
            .implements("t/Crazy")
            .implements("t/Mad"),
    ]);
    let act = sig("act", "()V");

    for (static_type, kind) in [
        ("t/Crazy", CallKind::Interface),
        ("t/Mad", CallKind::Interface),
        ("t/MadWoman", CallKind::Virtual),
    ] {
        let resolved = ctx.resolve(class(&ctx, static_type), &act, kind);
        assert_eq!(
            target(&ctx, &resolved).as_deref(),
            Some("t/MadMan.act()"),
            "{static_type}"
        );
    }
}

#[test]
fn polymorphic_interface_call_stays_unresolved() {
    let ctx = context(&[
        ClassDescriptor::interface("t/Shape").with_method(M::abstract_method("area", "()D")),
        ClassDescriptor::class("t/Circle", OBJECT)
            .implements("t/Shape")
            .with_method(M::concrete("area", "()D")),
        ClassDescriptor::class("t/Square", OBJECT)
            .implements("t/Shape")
            .with_method(M::concrete("area", "()D")),
    ]);
    let area = sig("area", "()D");
    let shape = class(&ctx, "t/Shape");

    let targets = ctx.dispatch_targets(shape, &area);
    assert!(targets.complete);
    let names: Vec<String> = targets
        .targets
        .iter()
        .map(|id| ctx.hierarchy().display_method(*id))
        .collect();
    assert_eq!(names, vec!["t/Circle.area()", "t/Square.area()"]);
    assert_eq!(targets.single(), None);

    let declaration = ctx.bound_declaration(shape, &area);
    assert_eq!(
        ctx.resolve(shape, &area, CallKind::Interface),
        Resolution::Unresolved(UnresolvedReference::AbstractSlot { declaration })
    );
}

#[test]
fn unresolvable_subtype_makes_targets_incomplete() {
    let ctx = context(&[
        ClassDescriptor::interface("t/Task").with_method(M::abstract_method("run", "()V")),
        ClassDescriptor::class("t/Job", OBJECT)
            .implements("t/Task")
            .with_method(M::concrete("run", "()V")),
        ClassDescriptor::class("t/Adapter", "lib/Runner").implements("t/Task"),
    ]);
    let run = sig("run", "()V");
    let task = class(&ctx, "t/Task");

    let targets = ctx.dispatch_targets(task, &run);
    assert!(!targets.complete);
    assert_eq!(targets.targets.len(), 1);
    assert!(!ctx.resolve(task, &run, CallKind::Interface).is_resolved());
}

#[test]
fn abstract_type_without_implementations_is_unresolved() {
    let ctx = context(&[ClassDescriptor::interface("t/Lonely")
        .with_method(M::abstract_method("ping", "()V"))]);
    let lonely = class(&ctx, "t/Lonely");
    let ping = sig("ping", "()V");

    assert!(ctx.dispatch_targets(lonely, &ping).targets.is_empty());
    assert!(!ctx.resolve(lonely, &ping, CallKind::Interface).is_resolved());
}
