use crate::docs::{DocAppender, NullDocAppender};
use crate::error::GenerateResult;
use crate::observer::{NullObserver, RenderObserver};
use crate::options::{GeneratorOptions, OutputMode};
use crate::pipeline::FormatterPipeline;
use crate::renderer::RenderPass;
use crate::resolver::TypeResolver;
use declgen_model::{HostType, TypeKind, TypeModel, TypeRef};
use tracing::instrument;

/// Renders a [`TypeModel`] into TypeScript declaration source
///
/// Configuration (options, formatters, convertors, hooks, references) is set
/// up front; rendering only borrows the generator, so the same instance can
/// render any number of models and modes.
pub struct TypeScriptGenerator {
    pub options: GeneratorOptions,
    pipeline: FormatterPipeline,
    doc_appender: Box<dyn DocAppender>,
    references: Vec<String>,
}

impl TypeScriptGenerator {
    pub fn new() -> Self {
        Self::with_options(GeneratorOptions::default())
    }

    pub fn with_options(options: GeneratorOptions) -> Self {
        Self {
            options,
            pipeline: FormatterPipeline::new(),
            doc_appender: Box::new(NullDocAppender),
            references: Vec::new(),
        }
    }

    pub fn pipeline(&self) -> &FormatterPipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut FormatterPipeline {
        &mut self.pipeline
    }

    /// Shorthand for [`FormatterPipeline::register_formatter`]
    pub fn register_formatter<F>(&mut self, kind: TypeKind, formatter: F)
    where
        F: Fn(&TypeResolver<'_>, &TypeRef) -> String + Send + Sync + 'static,
    {
        self.pipeline.register_formatter(kind, formatter);
    }

    /// Shorthand for [`FormatterPipeline::register_convertor`]
    pub fn register_convertor<F>(&mut self, host: impl Into<HostType>, convertor: F)
    where
        F: Fn(&TypeRef) -> String + Send + Sync + 'static,
    {
        self.pipeline.register_convertor(host, convertor);
    }

    pub fn set_doc_appender(&mut self, appender: impl DocAppender + 'static) {
        self.doc_appender = Box::new(appender);
    }

    /// Declare an external declaration file at the top of the output
    pub fn add_reference(&mut self, reference: impl Into<String>) {
        let reference = reference.into();
        if !self.references.contains(&reference) {
            self.references.push(reference);
        }
    }

    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// Resolver bound to this generator's pipeline
    pub fn resolver<'a>(&'a self, model: &'a TypeModel) -> TypeResolver<'a> {
        TypeResolver::new(model, &self.pipeline)
    }

    /// Render with the configured output mode
    pub fn render(&self, model: &TypeModel) -> GenerateResult<String> {
        self.render_mode(model, self.options.output)
    }

    pub fn render_mode(&self, model: &TypeModel, mode: OutputMode) -> GenerateResult<String> {
        self.render_observed(model, mode, &mut NullObserver)
    }

    /// Render and report progress to an explicit observer
    #[instrument(skip_all, fields(mode = ?mode))]
    pub fn render_observed(
        &self,
        model: &TypeModel,
        mode: OutputMode,
        observer: &mut dyn RenderObserver,
    ) -> GenerateResult<String> {
        RenderPass::new(
            self.resolver(model),
            &self.options,
            self.doc_appender.as_ref(),
            &self.references,
            mode,
            observer,
        )
        .run()
    }
}

impl Default for TypeScriptGenerator {
    fn default() -> Self {
        Self::new()
    }
}
