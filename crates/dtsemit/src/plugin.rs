//! The per-build plugin context
//!
//! A [`DtsPlugin`] is built once per build. While collecting it observes every
//! transformed module and registers the declaration-relevant ones with the
//! compiler session. [`DtsPlugin::generate_bundle`] consumes it, so a plugin can
//! never be reused for a second build or receive modules after emission.

use anyhow::Result;
use log::{debug, trace};

use crate::{
    admission::{self, Admission},
    config::Config,
    emit::{EmitSummary, OutputOptions, RemapSettings, emit_declarations},
    engine::{CompilerEngine, TscEngine},
    filter::PathFilter,
    module_registry::{ModuleHandle, ModuleRegistry},
    session::CompilerSession,
    sink::{FsSink, OutputSink},
};

#[derive(Debug)]
pub struct DtsPlugin<E = TscEngine> {
    config: Config,
    filter: PathFilter,
    session: CompilerSession<E>,
    registry: ModuleRegistry,
}

impl<E: CompilerEngine> DtsPlugin<E> {
    pub fn new(config: Config) -> Result<Self> {
        let filter = config.path_filter()?;
        let session = CompilerSession::new(&config.root, config.project.as_ref())?;
        Ok(Self {
            config,
            filter,
            session,
            registry: ModuleRegistry::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn session(&self) -> &CompilerSession<E> {
        &self.session
    }

    /// Observe one transformed module
    ///
    /// The code itself passes through the bundler unchanged. Returns the handle
    /// when the module was admitted, `None` when it is not declaration-relevant.
    pub fn transform(&mut self, code: &str, id: &str) -> Result<Option<&ModuleHandle>> {
        if code.is_empty() {
            trace!("Skipping {id}: empty module");
            return Ok(None);
        }
        if !self.filter.matches(id) {
            trace!("Skipping {id}: filtered out");
            return Ok(None);
        }

        let Some(admission) = admission::classify(id, &self.config.root) else {
            trace!("Skipping {id}: not declaration-relevant");
            return Ok(None);
        };

        let source = match &admission {
            Admission::ScriptBlock {
                component_path,
                logical_path,
                lang,
            } => {
                debug!(
                    "Script block of {} ({lang:?}) registered by content",
                    component_path.display()
                );
                self.session.register_content(logical_path, code)?
            }
            // The bundler's code is dropped; the engine reads the file itself
            Admission::Standalone { path } => self.session.register_path(path)?,
        };

        let kind = admission.kind();
        let logical_path = admission.into_logical_path();
        debug!("Admitted {id} as {} ({kind})", logical_path.display());

        Ok(Some(self.registry.push(ModuleHandle {
            id: source,
            logical_path,
            kind,
        })))
    }

    /// End of build: emit declarations for every admitted module to disk
    pub fn generate_bundle(self, output: &OutputOptions) -> Result<EmitSummary> {
        self.generate_bundle_into(output, &mut FsSink)
    }

    /// End of build with an explicit sink
    pub fn generate_bundle_into<S>(self, output: &OutputOptions, sink: &mut S) -> Result<EmitSummary>
    where
        S: OutputSink + ?Sized,
    {
        let Self {
            config,
            session,
            registry,
            ..
        } = self;

        let settings = RemapSettings {
            root: &config.root,
            clean_vue_file_name: config.clean_vue_file_name,
        };
        emit_declarations(session, &registry, settings, output, sink)
    }
}
