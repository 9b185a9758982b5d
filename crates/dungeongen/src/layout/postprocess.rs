use super::model::DungeonLayout;

/// Final adjustment pass over a finished layout.
///
/// Implementations must return a layout that still satisfies every invariant
/// checked by [`super::assembler::validate`].
pub trait PostProcess: Send + Sync {
    fn process(&self, layout: DungeonLayout) -> DungeonLayout;
}

/// Returns the layout unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl PostProcess for Identity {
    fn process(&self, layout: DungeonLayout) -> DungeonLayout {
        layout
    }
}

impl<F> PostProcess for F
where
    F: Fn(DungeonLayout) -> DungeonLayout + Send + Sync,
{
    fn process(&self, layout: DungeonLayout) -> DungeonLayout {
        self(layout)
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::layout::assembler::LayoutChanges;

    #[test]
    fn identity_is_a_no_op() {
        let layout = DungeonLayout::empty("test");
        assert_eq!(Identity.process(layout.clone()), layout);
    }

    #[test]
    fn closures_are_post_processors() {
        let rename = |l: DungeonLayout| l.with_updates(LayoutChanges::new().name("renamed"));
        let out = rename.process(DungeonLayout::empty("test"));
        assert_eq!(out.name, "renamed");
    }
}
