//! Lazy resolution of cross references met during decoding.

use std::sync::{Arc, Weak};

use tracing::{debug, warn};

use crate::codec::{CodecError, PackageReader};
use crate::error::{LoadError, LoadResult};
use crate::loader::LoadContext;
use crate::prefab::{
    BuildingProp, FieldContext, FieldKind, FieldResolver, FieldValue, PrefabKind, VehicleTrailer,
};

/// Field resolver that loads referenced items on demand.
///
/// Building placements name props and trees; vehicles name their trailers.
/// When such a reference is not loaded yet, the referenced item is found in
/// the pool and loaded out of band before decoding continues. Every other
/// field kind goes to the fallback resolver.
///
/// The resolver holds a weak handle to the session context, so it never
/// keeps a finished session alive.
pub struct CrossRefResolver {
    ctx: Weak<LoadContext>,
    fallback: Arc<dyn FieldResolver>,
}

impl CrossRefResolver {
    pub fn new(ctx: Weak<LoadContext>, fallback: Arc<dyn FieldResolver>) -> Self {
        Self { ctx, fallback }
    }

    /// Resolve a prop or tree reference, loading it when needed.
    fn prop_or_tree(&self, ctx: &LoadContext, kind: PrefabKind, name: &str, referrer: &str) -> Option<String> {
        if let Some(prefab) = ctx.registry().find_loaded(kind, name) {
            return Some(prefab.name.clone());
        }
        if name.is_empty() {
            return None;
        }

        let loaded = ctx.load_prop_tree(name, referrer)?;
        let found = ctx.registry().find_loaded(kind, &loaded);
        if found.is_none() {
            debug!(name, %kind, "Loaded reference has another kind");
        }
        found.map(|p| p.name.clone())
    }

    fn building_prop(
        &self,
        ctx: &LoadContext,
        field: &FieldContext<'_>,
        r: &mut PackageReader,
    ) -> Result<BuildingProp, CodecError> {
        let prop_name = r.read_string()?;
        let tree_name = r.read_string()?;
        let prop = self.prop_or_tree(ctx, PrefabKind::Prop, &prop_name, field.referrer);
        let tree = self.prop_or_tree(ctx, PrefabKind::Tree, &tree_name, field.referrer);

        Ok(BuildingProp {
            prop,
            tree,
            position: r.read_vec3()?,
            angle: r.read_f32()?,
            probability: r.read_i32()?,
            fixed_height: r.read_bool()?,
        })
    }

    fn vehicle_trailer(
        &self,
        ctx: &LoadContext,
        field: &FieldContext<'_>,
        r: &mut PackageReader,
    ) -> Result<VehicleTrailer, CodecError> {
        let name = r.read_string()?;
        let trailer_name = format!("{}.{}", field.package, name);

        let mut info = ctx
            .registry()
            .find_loaded(PrefabKind::Vehicle, &trailer_name);
        if info.is_none() && ctx.load_trailer(field.package, &name, field.referrer) {
            info = ctx
                .registry()
                .find_loaded(PrefabKind::Vehicle, &trailer_name);
        }

        Ok(VehicleTrailer {
            info: info.map(|p| p.name.clone()),
            probability: r.read_i32()?,
            invert_probability: r.read_i32()?,
        })
    }
}

impl FieldResolver for CrossRefResolver {
    fn resolve(
        &self,
        field: &FieldContext<'_>,
        kind: FieldKind,
        reader: &mut PackageReader,
    ) -> LoadResult<FieldValue> {
        let codec = |source: CodecError| LoadError::Payload {
            asset: field.referrer.to_string(),
            source,
        };

        match kind {
            FieldKind::BuildingProp | FieldKind::VehicleTrailer => {
                let Some(ctx) = self.ctx.upgrade() else {
                    warn!(referrer = field.referrer, "Cross reference after session end");
                    return Err(LoadError::Decoder("session has ended".to_string()));
                };
                if kind == FieldKind::BuildingProp {
                    self.building_prop(&ctx, field, reader)
                        .map(FieldValue::BuildingProp)
                        .map_err(codec)
                } else {
                    self.vehicle_trailer(&ctx, field, reader)
                        .map(FieldValue::VehicleTrailer)
                        .map_err(codec)
                }
            }
            _ => self.fallback.resolve(field, kind, reader),
        }
    }
}
