use devirt_config::AnalysisConfig;
use devirt_descriptor::{CallKind, ProgramDescriptor};
use devirt_hierarchy::{HierarchyBuilder, HierarchyError};
use devirt_resolve::{CallSite, Resolution, ResolutionContext};
use devirt_specialize::{SpecializationDecision, Specializer};
use serde::Serialize;

/// A built hierarchy plus the program's call sites bound against it.
pub(crate) struct Analysis {
    pub ctx: ResolutionContext,
    pub sites: Vec<CallSite>,
    /// Call sites whose descriptors could not be parsed, with the reason.
    pub invalid: Vec<(String, CallKind, String)>,
}

impl Analysis {
    pub fn build(
        program: &ProgramDescriptor,
        config: &AnalysisConfig,
    ) -> Result<Self, HierarchyError> {
        let hierarchy = HierarchyBuilder::new(config.root_type.as_str())
            .with_root_store(config.root_store.as_str())
            .build(&program.classes)?;

        let mut sites = Vec::with_capacity(program.call_sites.len());
        let mut invalid = Vec::new();
        for site in &program.call_sites {
            match CallSite::bind(&hierarchy, site) {
                Ok(bound) => sites.push(bound),
                Err(err) => {
                    tracing::warn!(
                        target = "devirt.cli",
                        call_site = %site.id,
                        error = %err,
                        "skipping malformed call site"
                    );
                    invalid.push((site.id.clone(), site.kind, err.to_string()));
                }
            }
        }

        Ok(Self {
            ctx: ResolutionContext::new(hierarchy),
            sites,
            invalid,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckReport {
    pub root_type: String,
    pub classes: usize,
    pub external_classes: usize,
    pub methods: usize,
    pub call_sites: usize,
}

impl CheckReport {
    pub fn new(analysis: &Analysis) -> Self {
        let hierarchy = analysis.ctx.hierarchy();
        let external_classes = hierarchy.external_classes().count();
        Self {
            root_type: hierarchy.name(hierarchy.root()).to_string(),
            classes: hierarchy.class_count() - external_classes,
            external_classes,
            methods: hierarchy.method_count(),
            call_sites: analysis.sites.len() + analysis.invalid.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ResolveReport {
    pub call_sites: Vec<CallSiteReport>,
    pub summary: ResolveSummary,
}

#[derive(Debug, Serialize)]
pub(crate) struct CallSiteReport {
    pub id: String,
    pub kind: CallKind,
    /// `resolved`, `array_clone`, `unresolved` or `invalid`.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Only for `super` calls, and only when desuperification is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desuperify: Option<bool>,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct ResolveSummary {
    pub resolved: usize,
    pub unresolved: usize,
    pub invalid: usize,
}

impl ResolveReport {
    pub fn new(analysis: &Analysis, config: &AnalysisConfig) -> Self {
        let ctx = &analysis.ctx;
        let hierarchy = ctx.hierarchy();
        let resolutions = ctx.resolve_all(&analysis.sites);

        let mut summary = ResolveSummary::default();
        let mut call_sites = Vec::with_capacity(resolutions.len() + analysis.invalid.len());
        for (site, resolution) in analysis.sites.iter().zip(resolutions) {
            let mut entry = CallSiteReport {
                id: site.id.clone(),
                kind: site.kind,
                status: "resolved",
                target: None,
                result_type: None,
                reason: None,
                desuperify: None,
            };
            match resolution {
                Resolution::Method(id) => {
                    summary.resolved += 1;
                    entry.target = Some(hierarchy.display_method(id));
                }
                Resolution::ArrayClone(ty) => {
                    summary.resolved += 1;
                    entry.status = "array_clone";
                    entry.result_type = Some(ty.to_string());
                }
                Resolution::Unresolved(reason) => {
                    summary.unresolved += 1;
                    entry.status = "unresolved";
                    entry.reason = Some(reason.to_string());
                }
            }
            if config.desuperify && site.kind == CallKind::Super {
                entry.desuperify = site.caller.map(|caller| ctx.can_desuperify(caller, &site.sig));
            }
            call_sites.push(entry);
        }

        for (id, kind, reason) in &analysis.invalid {
            summary.invalid += 1;
            call_sites.push(CallSiteReport {
                id: id.clone(),
                kind: *kind,
                status: "invalid",
                target: None,
                result_type: None,
                reason: Some(reason.clone()),
                desuperify: None,
            });
        }

        Self {
            call_sites,
            summary,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SpecializeReport {
    /// Slots that were narrowed or hit a collision; unchanged slots are omitted.
    pub slots: Vec<SlotReport>,
    pub summary: SpecializeSummary,
}

#[derive(Debug, Serialize)]
pub(crate) struct SlotReport {
    pub method: String,
    /// `specialized` or `conflict`.
    pub decision: &'static str,
    pub declared: String,
    pub effective: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflict_candidates: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub licensed_call_sites: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct SpecializeSummary {
    pub enabled: bool,
    pub specialized: usize,
    pub conflicts: usize,
}

impl SpecializeReport {
    pub fn new(analysis: &Analysis, config: &AnalysisConfig) -> Self {
        let ctx = &analysis.ctx;
        let hierarchy = ctx.hierarchy();
        let plan = Specializer::new()
            .enabled(config.specialize_return_types)
            .run(ctx, &analysis.sites);

        let slots: Vec<SlotReport> = plan
            .decisions()
            .filter_map(|(slot, decision)| {
                let (label, candidates) = match decision {
                    SpecializationDecision::Unchanged => return None,
                    SpecializationDecision::Specialized(_) => ("specialized", Vec::new()),
                    SpecializationDecision::Conflict(collision) => (
                        "conflict",
                        collision
                            .candidates
                            .iter()
                            .map(|c| hierarchy.name(*c).to_string())
                            .collect(),
                    ),
                };
                Some(SlotReport {
                    method: hierarchy.display_method(slot),
                    decision: label,
                    declared: hierarchy.method(slot).return_type.to_string(),
                    effective: plan.effective_return(slot).to_string(),
                    conflict_candidates: candidates,
                    licensed_call_sites: plan.licensed_call_sites(slot).to_vec(),
                })
            })
            .collect();

        let summary = SpecializeSummary {
            enabled: config.specialize_return_types,
            specialized: plan.specialized_count(),
            conflicts: plan.conflicts().count(),
        };
        Self { slots, summary }
    }
}
