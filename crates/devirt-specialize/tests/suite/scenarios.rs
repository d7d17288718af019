use devirt_descriptor::{
    CallKind, CallSiteDescriptor, ClassDescriptor, FieldType, MethodDescriptorStub as M,
    ReturnType,
};
use devirt_specialize::{OverrideGraph, Specializer};
use pretty_assertions::assert_eq;

use super::{run, run_with, OBJECT};

fn cats() -> Vec<ClassDescriptor> {
    vec![
        ClassDescriptor::class("t/Animal", OBJECT)
            .with_method(M::concrete("make", "()Lt/Animal;").returning("t/Animal")),
        ClassDescriptor::class("t/Cat", "t/Animal")
            .with_method(M::concrete("make", "()Lt/Animal;").returning("t/Cat")),
        ClassDescriptor::class("t/NotYourFavoriteCat", "t/Cat")
            .with_method(M::concrete("make", "()Lt/Animal;").returning("t/NotYourFavoriteCat")),
    ]
}

#[test]
fn interface_slot_narrows_to_its_only_implementation() {
    let run = run(&[
        ClassDescriptor::interface("t/Intf").with_method(M::abstract_method("get", "()Lt/Intf;")),
        ClassDescriptor::class("t/Impl", OBJECT)
            .implements("t/Intf")
            .with_method(M::concrete("get", "()Lt/Intf;").returning("t/Impl")),
    ]);

    assert_eq!(run.decision("t/Impl", "get"), "Specialized(t/Impl)");
    assert_eq!(run.decision("t/Intf", "get"), "Specialized(t/Impl)");
    assert_eq!(
        run.plan.effective_return(run.slot("t/Intf", "get")),
        &ReturnType::Type(FieldType::object("t/Impl"))
    );
    run.assert_overrides_stay_valid();
}

#[test]
fn each_level_of_a_chain_narrows_to_what_it_and_its_overriders_return() {
    let run = run(&cats());

    assert_eq!(run.decision("t/Animal", "make"), "Unchanged");
    assert_eq!(run.decision("t/Cat", "make"), "Specialized(t/Cat)");
    assert_eq!(
        run.decision("t/NotYourFavoriteCat", "make"),
        "Specialized(t/NotYourFavoriteCat)"
    );
    run.assert_overrides_stay_valid();
}

#[test]
fn licensed_call_sites_are_the_ones_bound_to_the_slot() {
    let sites = [
        CallSiteDescriptor::new("via-cat", "t/Cat", "make", "()Lt/Animal;", CallKind::Virtual),
        CallSiteDescriptor::new("via-animal", "t/Animal", "make", "()Lt/Animal;", CallKind::Virtual),
        CallSiteDescriptor::new(
            "via-favorite",
            "t/NotYourFavoriteCat",
            "make",
            "()Lt/Animal;",
            CallKind::Virtual,
        ),
    ];
    let run = run_with(&cats(), &sites, Specializer::new());

    assert_eq!(run.plan.licensed_call_sites(run.slot("t/Cat", "make")), ["via-cat"]);
    assert_eq!(
        run.plan
            .licensed_call_sites(run.slot("t/NotYourFavoriteCat", "make")),
        ["via-favorite"]
    );
    assert!(run
        .plan
        .licensed_call_sites(run.slot("t/Animal", "make"))
        .is_empty());
}

#[test]
fn interface_slot_follows_a_body_inherited_from_an_unrelated_superclass() {
    let classes = vec![
        ClassDescriptor::interface("t/Crazy")
            .with_method(M::abstract_method("getMad", "()Ljava/lang/Object;")),
        ClassDescriptor::class("t/MadMan", OBJECT)
            .with_method(M::concrete("getMad", "()Ljava/lang/Object;").returning("t/MadMan")),
        ClassDescriptor::class("t/MadWoman", "t/MadMan").implements("t/Crazy"),
    ];
    let run = run(&classes);

    let crazy = run.slot("t/Crazy", "getMad");
    let mad_man = run.slot("t/MadMan", "getMad");
    let graph = OverrideGraph::build(&run.ctx);
    assert_eq!(graph.overriders(crazy), [mad_man]);
    assert!(graph.groups().iter().any(|g| g == &vec![mad_man.min(crazy), mad_man.max(crazy)]));

    assert_eq!(run.decision("t/MadMan", "getMad"), "Specialized(t/MadMan)");
    assert_eq!(run.decision("t/Crazy", "getMad"), "Specialized(t/MadMan)");
    run.assert_overrides_stay_valid();

    // A second, unrelated implementation widens the interface slot back to the root type.
    let mut more = classes;
    more.push(
        ClassDescriptor::class("t/CrazyPerson", OBJECT)
            .implements("t/Crazy")
            .with_method(M::concrete("getMad", "()Ljava/lang/Object;").returning("t/CrazyPerson")),
    );
    let run = super::run(&more);
    assert_eq!(run.decision("t/Crazy", "getMad"), "Unchanged");
    assert_eq!(run.decision("t/MadMan", "getMad"), "Specialized(t/MadMan)");
    assert_eq!(run.decision("t/CrazyPerson", "getMad"), "Specialized(t/CrazyPerson)");
    run.assert_overrides_stay_valid();
}

#[test]
fn non_class_returns_and_unknown_bodies_are_unchanged() {
    let run = run(&[
        ClassDescriptor::class("t/Box", OBJECT)
            .with_method(M::concrete("size", "()I"))
            .with_method(M::concrete("clear", "()V"))
            .with_method(M::concrete("items", "()[Lt/Box;"))
            .with_method(M::concrete("self", "()Lt/Box;"))
            .with_method(M::concrete("other", "()Lt/Box;").returning("t/Unrelated")),
        ClassDescriptor::class("t/Unrelated", OBJECT),
    ]);

    for name in ["size", "clear", "items", "self", "other"] {
        assert_eq!(run.decision("t/Box", name), "Unchanged", "{name}");
    }
}

#[test]
fn overrides_of_external_supertypes_are_left_alone() {
    let run = run(&[
        ClassDescriptor::class("t/Screen", "lib/Activity")
            .with_method(M::concrete("host", "()Ljava/lang/Object;").returning("t/Screen")),
    ]);
    assert_eq!(run.decision("t/Screen", "host"), "Unchanged");
}

#[test]
fn interface_slot_stays_declared_when_an_implementor_inherits_an_unknown_body() {
    let sites = [CallSiteDescriptor::new(
        "via-i",
        "t/I",
        "getVal",
        "()Lt/Base;",
        CallKind::Interface,
    )];
    let run = run_with(
        &[
            ClassDescriptor::class("t/Base", OBJECT),
            ClassDescriptor::class("t/Impl", "t/Base"),
            ClassDescriptor::interface("t/I")
                .with_method(M::abstract_method("getVal", "()Lt/Base;")),
            ClassDescriptor::class("t/A", OBJECT)
                .implements("t/I")
                .with_method(M::concrete("getVal", "()Lt/Base;").returning("t/Impl")),
            // getVal comes from lib/Ext, which the program does not contain.
            ClassDescriptor::class("t/X", "lib/Ext").implements("t/I"),
        ],
        &sites,
        Specializer::new(),
    );

    let i_get_val = run.slot("t/I", "getVal");
    assert!(OverrideGraph::build(&run.ctx).has_unknown_implementors(i_get_val));
    assert_eq!(run.decision("t/I", "getVal"), "Unchanged");
    assert_eq!(
        run.plan.effective_return(i_get_val),
        &ReturnType::Type(FieldType::object("t/Base"))
    );
    assert!(run.plan.licensed_call_sites(i_get_val).is_empty());

    // The visible implementation still narrows; it remains a valid override.
    assert_eq!(run.decision("t/A", "getVal"), "Specialized(t/Impl)");
    run.assert_overrides_stay_valid();
}

#[test]
fn static_methods_narrow_on_their_own() {
    let run = run(&[ClassDescriptor::class("t/Factory", OBJECT)
        .with_method(M::static_method("create", "()Ljava/lang/Object;").returning("t/Factory"))]);
    assert_eq!(run.decision("t/Factory", "create"), "Specialized(t/Factory)");
}
