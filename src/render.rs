use crate::{
    assets::PreparedAssetStore,
    compile::ScenePlan,
    error::SkockoResult,
};

#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

pub trait RenderBackend {
    fn render_plan(
        &mut self,
        plan: &ScenePlan,
        assets: &PreparedAssetStore,
    ) -> SkockoResult<FrameRGBA>;
}

#[derive(Clone, Copy, Debug)]
pub enum BackendKind {
    Cpu,
}

#[derive(Clone, Debug, Default)]
pub struct RenderSettings {
    pub clear_rgba: Option<[u8; 4]>,
}

pub fn create_backend(
    kind: BackendKind,
    settings: &RenderSettings,
) -> SkockoResult<Box<dyn RenderBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render_cpu::CpuBackend::new(
            settings.clone(),
        ))),
    }
}
