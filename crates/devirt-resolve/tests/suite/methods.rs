use devirt_descriptor::{CallKind, ClassDescriptor, MethodDescriptorStub as M};
use devirt_hierarchy::HierarchyBuilder;
use devirt_resolve::{Resolution, ResolutionContext, UnresolvedReference};
use pretty_assertions::assert_eq;

use super::{class, context, sig, target, OBJECT};

/// Base <- SubOne <- SubTwo <- SubThree; SubTwo inherits SubOne's override.
fn chain() -> Vec<ClassDescriptor> {
    vec![
        ClassDescriptor::class("t/Base", OBJECT).with_method(M::concrete("foo", "()Lt/Base;")),
        ClassDescriptor::class("t/SubOne", "t/Base")
            .with_method(M::concrete("foo", "()Lt/SubOne;")),
        ClassDescriptor::class("t/SubTwo", "t/SubOne"),
        ClassDescriptor::class("t/SubThree", "t/SubTwo")
            .with_method(M::concrete("foo", "()Lt/SubThree;")),
    ]
}

#[test]
fn virtual_calls_pick_the_nearest_body_on_the_superclass_chain() {
    let ctx = context(&chain());
    let foo = sig("foo", "()Lt/Base;");

    let expected = [
        ("t/Base", "t/Base.foo()"),
        ("t/SubOne", "t/SubOne.foo()"),
        ("t/SubTwo", "t/SubOne.foo()"),
        ("t/SubThree", "t/SubThree.foo()"),
    ];
    for (static_type, body) in expected {
        let resolved = ctx.resolve(class(&ctx, static_type), &foo, CallKind::Virtual);
        assert_eq!(target(&ctx, &resolved).as_deref(), Some(body), "{static_type}");
    }
}

#[test]
fn resolving_twice_gives_the_same_answer() {
    let ctx = context(&chain());
    let foo = sig("foo", "()Lt/Base;");
    let two = class(&ctx, "t/SubTwo");

    let first = ctx.resolve(two, &foo, CallKind::Virtual);
    let cached = ctx.cached_len();
    let second = ctx.resolve(two, &foo, CallKind::Virtual);
    assert_eq!(first, second);
    assert_eq!(ctx.cached_len(), cached);

    let fresh = ResolutionContext::new(HierarchyBuilder::default().build(&chain()).unwrap());
    assert_eq!(fresh.resolve(two, &foo, CallKind::Virtual), first);
}

#[test]
fn dispatch_on_a_known_runtime_type_uses_that_type() {
    let ctx = context(&chain());
    let foo = sig("foo", "()Lt/Base;");
    let base = class(&ctx, "t/Base");
    let three = class(&ctx, "t/SubThree");

    // The static type depends on how the instance was obtained, e.g. from a factory declared to
    // return Base or through a cast. The body does not.
    for static_type in ["t/Base", "t/SubOne", "t/SubTwo", "t/SubThree"] {
        let resolved = ctx.resolve_dispatch(class(&ctx, static_type), three, &foo);
        assert_eq!(
            target(&ctx, &resolved).as_deref(),
            Some("t/SubThree.foo()"),
            "{static_type}"
        );
    }

    let two = class(&ctx, "t/SubTwo");
    for static_type in ["t/Base", "t/SubOne", "t/SubTwo"] {
        let resolved = ctx.resolve_dispatch(class(&ctx, static_type), two, &foo);
        assert_eq!(
            target(&ctx, &resolved).as_deref(),
            Some("t/SubOne.foo()"),
            "{static_type}"
        );
    }

    assert_eq!(
        ctx.resolve_dispatch(three, base, &foo),
        Resolution::Unresolved(UnresolvedReference::NotASubtype {
            runtime: base,
            static_type: three,
        })
    );
}

#[test]
fn abstract_redeclaration_hides_inherited_body() {
    let ctx = context(&[
        ClassDescriptor::class("t/Top", OBJECT).with_method(M::concrete("run", "()V")),
        ClassDescriptor::class("t/Middle", "t/Top")
            .with_abstract()
            .with_method(M::abstract_method("run", "()V")),
        ClassDescriptor::class("t/Leaf", "t/Middle").with_method(M::concrete("run", "()V")),
        ClassDescriptor::class("t/OtherLeaf", "t/Middle").with_method(M::concrete("run", "()V")),
    ]);
    let run = sig("run", "()V");

    let resolved = ctx.resolve(class(&ctx, "t/Middle"), &run, CallKind::Virtual);
    let declaration = ctx.hierarchy().declared_method(
        class(&ctx, "t/Middle"),
        &run,
        |_| true,
    );
    assert_eq!(
        resolved,
        Resolution::Unresolved(UnresolvedReference::AbstractSlot { declaration })
    );
}

#[test]
fn static_calls_search_the_superclass_chain() {
    let ctx = context(&[
        ClassDescriptor::class("t/Util", OBJECT)
            .with_method(M::static_method("make", "()Lt/Util;")),
        ClassDescriptor::class("t/MoreUtil", "t/Util"),
    ]);
    let make = sig("make", "()Lt/Util;");

    let resolved = ctx.resolve(class(&ctx, "t/MoreUtil"), &make, CallKind::Static);
    assert_eq!(target(&ctx, &resolved).as_deref(), Some("t/Util.make()"));

    // Static methods never answer virtual calls.
    let virtual_call = ctx.resolve(class(&ctx, "t/MoreUtil"), &make, CallKind::Virtual);
    assert!(!virtual_call.is_resolved());
}

#[test]
fn direct_calls_bind_to_the_exact_class() {
    let ctx = context(&[
        ClassDescriptor::class("t/Holder", OBJECT)
            .with_method(M::concrete("<init>", "()V"))
            .with_method(M::private_method("helper", "()I")),
        ClassDescriptor::class("t/SubHolder", "t/Holder"),
    ]);

    let init = ctx.resolve(class(&ctx, "t/Holder"), &sig("<init>", "()V"), CallKind::Direct);
    assert_eq!(target(&ctx, &init).as_deref(), Some("t/Holder.<init>()"));

    let helper = ctx.resolve(class(&ctx, "t/Holder"), &sig("helper", "()I"), CallKind::Direct);
    assert_eq!(target(&ctx, &helper).as_deref(), Some("t/Holder.helper()"));

    let inherited = ctx.resolve(
        class(&ctx, "t/SubHolder"),
        &sig("helper", "()I"),
        CallKind::Direct,
    );
    assert_eq!(inherited, Resolution::Unresolved(UnresolvedReference::NotFound));
}

#[test]
fn external_supertypes_degrade_to_unresolved() {
    let ctx = context(&[
        ClassDescriptor::class("t/Widget", "lib/View"),
        ClassDescriptor::class("t/FancyWidget", "t/Widget")
            .with_method(M::concrete("draw", "()V")),
    ]);
    let draw = sig("draw", "()V");
    let view = class(&ctx, "lib/View");

    // Known override below the external type still resolves.
    let fancy = ctx.resolve(class(&ctx, "t/FancyWidget"), &draw, CallKind::Virtual);
    assert_eq!(target(&ctx, &fancy).as_deref(), Some("t/FancyWidget.draw()"));

    // Widget inherits whatever lib/View does.
    assert_eq!(
        ctx.resolve(class(&ctx, "t/Widget"), &draw, CallKind::Virtual),
        Resolution::Unresolved(UnresolvedReference::ExternalType(view))
    );
    assert_eq!(
        ctx.resolve(view, &draw, CallKind::Virtual),
        Resolution::Unresolved(UnresolvedReference::ExternalType(view))
    );
}

#[test]
fn unrelated_interface_defaults_are_ambiguous() {
    let ctx = context(&[
        ClassDescriptor::interface("t/Left").with_method(M::concrete("greet", "()V")),
        ClassDescriptor::interface("t/Right").with_method(M::concrete("greet", "()V")),
        ClassDescriptor::class("t/Both", OBJECT)
            .implements("t/Left")
            .implements("t/Right"),
    ]);
    let greet = sig("greet", "()V");

    let resolved = ctx.resolve(class(&ctx, "t/Both"), &greet, CallKind::Virtual);
    let Resolution::Unresolved(UnresolvedReference::Ambiguous { candidates }) = resolved else {
        panic!("expected ambiguity, got {resolved:?}");
    };
    let names: Vec<String> = candidates
        .iter()
        .map(|id| ctx.hierarchy().display_method(*id))
        .collect();
    assert_eq!(names, vec!["t/Left.greet()", "t/Right.greet()"]);
}

#[test]
fn more_specific_interface_default_wins() {
    let ctx = context(&[
        ClassDescriptor::interface("t/Shape").with_method(M::concrete("name", "()Ljava/lang/String;")),
        ClassDescriptor::interface("t/Polygon")
            .implements("t/Shape")
            .with_method(M::concrete("name", "()Ljava/lang/String;")),
        ClassDescriptor::class("t/Square", OBJECT)
            .implements("t/Shape")
            .implements("t/Polygon"),
    ]);

    let resolved = ctx.resolve(
        class(&ctx, "t/Square"),
        &sig("name", "()Ljava/lang/String;"),
        CallKind::Interface,
    );
    assert_eq!(target(&ctx, &resolved).as_deref(), Some("t/Polygon.name()"));
}

#[test]
fn class_body_beats_interface_default() {
    let ctx = context(&[
        ClassDescriptor::interface("t/Greeter").with_method(M::concrete("greet", "()V")),
        ClassDescriptor::class("t/Parent", OBJECT).with_method(M::concrete("greet", "()V")),
        ClassDescriptor::class("t/Child", "t/Parent").implements("t/Greeter"),
    ]);

    let resolved = ctx.resolve(class(&ctx, "t/Child"), &sig("greet", "()V"), CallKind::Virtual);
    assert_eq!(target(&ctx, &resolved).as_deref(), Some("t/Parent.greet()"));
}
