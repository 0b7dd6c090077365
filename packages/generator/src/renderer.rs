use crate::docs::DocAppender;
use crate::error::{GenerateError, GenerateResult};
use crate::observer::{RenderEvent, RenderObserver, SkipReason};
use crate::options::{EnumStyle, GenerationVariant, GeneratorOptions, OutputMode};
use crate::pipeline::Declaration;
use crate::resolver::TypeResolver;
use crate::script::ScriptBuilder;
use declgen_model::{
    Class, ClassId, ConstantValue, EnumId, EnumLiteral, MemberKind, Module, ModuleId, Property,
    TypeModel, TypeRef,
};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

/// What a single module contributes to the document
struct ModulePlan<'a> {
    module: &'a Module,
    name: String,
    enums: Vec<EnumId>,
    /// All emitted classes, sorted by type name
    classes: Vec<ClassId>,
    /// Classes that are the base of another class here, bases first
    base_classes: Vec<ClassId>,
    derived_classes: Vec<ClassId>,
}

/// One render pass over an immutable model
///
/// Holds no state that outlives the pass, so concurrent passes with different
/// modes over the same model are independent.
pub(crate) struct RenderPass<'a, 'o> {
    model: &'a TypeModel,
    resolver: TypeResolver<'a>,
    options: &'a GeneratorOptions,
    docs: &'a dyn DocAppender,
    references: &'a [String],
    mode: OutputMode,
    classes_variant: bool,
    observer: &'o mut dyn RenderObserver,
}

impl<'a, 'o> RenderPass<'a, 'o> {
    pub(crate) fn new(
        resolver: TypeResolver<'a>,
        options: &'a GeneratorOptions,
        docs: &'a dyn DocAppender,
        references: &'a [String],
        mode: OutputMode,
        observer: &'o mut dyn RenderObserver,
    ) -> Self {
        let classes_variant = options.variant == GenerationVariant::Classes
            || mode.contains(OutputMode::CLASSES);
        Self {
            model: resolver.model(),
            resolver,
            options,
            docs,
            references,
            mode,
            classes_variant,
            observer,
        }
    }

    pub(crate) fn run(mut self) -> GenerateResult<String> {
        self.check_mode()?;

        let reachable = self.reachable_enums();
        let mut plans = Vec::new();
        for (id, module, name) in self.sorted_modules() {
            match self.plan_module(id, module, name.clone(), &reachable) {
                Ok(plan) => plans.push(plan),
                Err(reason) => {
                    debug!(module = %name, ?reason, "skipping module");
                    self.observer.on_event(RenderEvent::ModuleSkipped {
                        module: name,
                        reason,
                    });
                }
            }
        }

        let mut sb = ScriptBuilder::new(self.options.indentation.as_str());
        if self.mode.has_members() {
            self.append_references(&plans, &mut sb);
        }
        for plan in &plans {
            self.append_module(plan, &mut sb)?;
        }

        Ok(sb.into_output())
    }

    fn check_mode(&mut self) -> GenerateResult<()> {
        let conflicting = self.mode.contains(OutputMode::CONSTANTS)
            && self.mode.has_members()
            && !self.classes_variant;
        if !conflicting {
            return Ok(());
        }

        let mode = format!("{:?}", self.mode);
        if self.options.strict {
            return Err(GenerateError::ConflictingOutputModes { mode });
        }

        let message = format!(
            "constants requested together with properties or fields in declarations ({}); members may be described twice",
            mode
        );
        warn!("{}", message);
        self.observer.on_event(RenderEvent::Warning { message });
        Ok(())
    }

    /// Modules ordered by sort key, then by formatted name
    fn sorted_modules(&self) -> Vec<(ModuleId, &'a Module, String)> {
        let mut modules: Vec<(ModuleId, &'a Module, String)> = self
            .model
            .modules()
            .map(|(id, module)| (id, module, self.resolver.module_name(module)))
            .collect();
        modules.sort_by(|a, b| {
            a.1.sort_order
                .cmp(&b.1.sort_order)
                .then_with(|| a.2.cmp(&b.2))
                .then_with(|| a.0.cmp(&b.0))
        });
        modules
    }

    fn plan_module(
        &self,
        id: ModuleId,
        module: &'a Module,
        name: String,
        reachable: &BTreeSet<EnumId>,
    ) -> Result<ModulePlan<'a>, SkipReason> {
        if module.is_ignored {
            return Err(SkipReason::Ignored);
        }

        let classes: Vec<ClassId> = module
            .classes
            .iter()
            .copied()
            .filter(|class| self.is_emitted_class(*class))
            .collect();
        let classes = self.sort_by_type_name(classes, TypeRef::Class);

        let mut enums: Vec<EnumId> = module.enums.clone();
        enums.extend(
            reachable
                .iter()
                .copied()
                .filter(|e| self.model.enumeration(*e).module == id),
        );
        let enums: Vec<EnumId> = enums
            .into_iter()
            .filter(|e| self.is_emitted_enum(*e))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let enums = self.sort_by_type_name(enums, TypeRef::Enum);

        let contributes = (self.mode.contains(OutputMode::ENUMS) && !enums.is_empty())
            || (self.mode.has_members()
                && classes.iter().any(|c| self.model.class(*c).has_data_members()))
            || (self.mode.contains(OutputMode::CONSTANTS)
                && classes.iter().any(|c| self.model.class(*c).has_constants()));
        if !contributes {
            return Err(SkipReason::NothingToEmit);
        }

        let bases: HashSet<ClassId> = classes
            .iter()
            .filter_map(|c| self.model.class(*c).base)
            .collect();
        let (base_classes, derived_classes): (Vec<ClassId>, Vec<ClassId>) =
            classes.iter().copied().partition(|c| bases.contains(c));
        let base_classes = self.order_bases(base_classes);

        Ok(ModulePlan {
            module,
            name,
            enums,
            classes,
            base_classes,
            derived_classes,
        })
    }

    fn is_emitted_class(&self, id: ClassId) -> bool {
        !self.model.class(id).is_ignored && !self.resolver.is_converted(&TypeRef::Class(id))
    }

    fn is_emitted_enum(&self, id: EnumId) -> bool {
        !self.model.enumeration(id).is_ignored && !self.resolver.is_converted(&TypeRef::Enum(id))
    }

    fn sort_by_type_name<T: Copy + Ord>(&self, ids: Vec<T>, to_ref: fn(T) -> TypeRef) -> Vec<T> {
        let mut named: Vec<(String, T)> = ids
            .into_iter()
            .map(|id| (self.resolver.type_name(&to_ref(id)), id))
            .collect();
        named.sort();
        named.into_iter().map(|(_, id)| id).collect()
    }

    /// Keep name order, but pull each base ahead of the classes deriving from it
    fn order_bases(&self, sorted: Vec<ClassId>) -> Vec<ClassId> {
        fn place(
            model: &TypeModel,
            id: ClassId,
            members: &HashSet<ClassId>,
            placed: &mut HashSet<ClassId>,
            ordered: &mut Vec<ClassId>,
        ) {
            if placed.contains(&id) {
                return;
            }
            if let Some(base) = model.class(id).base {
                if members.contains(&base) {
                    place(model, base, members, placed, ordered);
                }
            }
            placed.insert(id);
            ordered.push(id);
        }

        let members: HashSet<ClassId> = sorted.iter().copied().collect();
        let mut placed = HashSet::new();
        let mut ordered = Vec::with_capacity(sorted.len());
        for id in sorted {
            place(self.model, id, &members, &mut placed, &mut ordered);
        }
        ordered
    }

    /// Enums reachable from emitted class members, through collections and
    /// generic arguments
    fn reachable_enums(&self) -> BTreeSet<EnumId> {
        fn walk(
            model: &TypeModel,
            ty: &TypeRef,
            found: &mut BTreeSet<EnumId>,
            seen: &mut HashSet<ClassId>,
        ) {
            match ty {
                TypeRef::Enum(id) => {
                    found.insert(*id);
                }
                TypeRef::Collection(collection) => walk(model, &collection.items, found, seen),
                TypeRef::Class(id) => {
                    if seen.insert(*id) {
                        for argument in &model.class(*id).generic_arguments {
                            walk(model, argument, found, seen);
                        }
                    }
                }
                TypeRef::System(_) | TypeRef::GenericParameter(_) => {}
            }
        }

        let mut found = BTreeSet::new();
        let mut seen = HashSet::new();
        for (_, module) in self.model.modules().filter(|(_, m)| !m.is_ignored) {
            for id in module.classes.iter().filter(|c| self.is_emitted_class(**c)) {
                for member in self.model.class(*id).members.iter().filter(|m| !m.is_ignored) {
                    walk(self.model, &member.ty, &mut found, &mut seen);
                }
            }
        }
        found
    }

    fn append_references(&self, plans: &[ModulePlan<'a>], sb: &mut ScriptBuilder) {
        let mut seen = HashSet::new();
        let references: Vec<&str> = self
            .references
            .iter()
            .map(String::as_str)
            .chain(
                plans
                    .iter()
                    .flat_map(|plan| plan.module.references.iter().map(String::as_str)),
            )
            .filter(|reference| seen.insert(*reference))
            .collect();
        if references.is_empty() {
            return;
        }

        for reference in references {
            sb.add_line(&format!("/// <reference path=\"{}\" />", reference));
        }
        sb.add_line("");
    }

    fn append_module(&mut self, plan: &ModulePlan<'a>, sb: &mut ScriptBuilder) -> GenerateResult<()> {
        debug!(module = %plan.name, "rendering module");
        self.observer.on_event(RenderEvent::ModuleStarted {
            module: plan.name.clone(),
        });

        if plan.name.is_empty() {
            return self.append_module_body(plan, sb);
        }

        let ambient = !self.classes_variant && self.mode.has_members();
        let keyword = if ambient { "declare namespace" } else { "namespace" };
        sb.add_line(&format!("{} {} {{", keyword, plan.name));
        self.append_module_body(plan, &mut sb.indent())?;
        sb.add_line("}");
        Ok(())
    }

    fn append_module_body(&mut self, plan: &ModulePlan<'a>, sb: &mut ScriptBuilder) -> GenerateResult<()> {
        if self.mode.contains(OutputMode::ENUMS) {
            for id in &plan.enums {
                self.append_enum(*id, sb);
            }
        }

        if self.mode.has_members() {
            for id in plan.base_classes.iter().chain(plan.derived_classes.iter()) {
                self.append_class(*id, sb)?;
            }
        }

        if self.mode.contains(OutputMode::CONSTANTS) {
            for id in &plan.classes {
                let class = self.model.class(*id);
                if class.has_constants() && !self.inlines_constants(class) {
                    self.append_constant_module(*id, sb);
                }
            }
        }
        Ok(())
    }

    fn inlines_constants(&self, class: &Class) -> bool {
        self.classes_variant
            && !class.is_interface
            && self.mode.contains(OutputMode::CONSTANTS)
            && self.mode.has_members()
    }

    fn visibility(&self, declaration: Declaration<'_>, type_name: &str) -> &'static str {
        if self.resolver.is_visible(declaration, type_name) {
            "export "
        } else {
            ""
        }
    }

    fn append_class(&mut self, id: ClassId, sb: &mut ScriptBuilder) -> GenerateResult<()> {
        let class = self.model.class(id);
        let type_name = self.resolver.type_name(&TypeRef::Class(id));
        let as_class = self.classes_variant && !class.is_interface;
        let members = self.collect_members(class)?;
        let constants = if self.inlines_constants(class) {
            self.sorted_constants(class)
        } else {
            Vec::new()
        };

        self.docs.append_class_doc(sb, class, &type_name);
        sb.add_line(&format!(
            "{}{} {}{} {{",
            self.visibility(Declaration::Class(class), &type_name),
            if as_class { "class" } else { "interface" },
            type_name,
            self.heritage_clause(class, as_class)
        ));
        {
            let mut body = sb.indent();
            for (name, constant) in &constants {
                let constant_type = self.resolver.member_type_name(constant);
                self.docs
                    .append_property_doc(&mut body, constant, name, &constant_type);
                body.add_line(&format!(
                    "static readonly {}: {} = {};",
                    name,
                    constant_type,
                    constant_literal(constant.constant_value.as_ref())
                ));
            }
            for (name, member) in &members {
                let member_type = self.resolver.member_type_name(member);
                self.docs
                    .append_property_doc(&mut body, member, name, &member_type);
                let optional = if member.is_optional { "?" } else { "" };
                body.add_line(&format!("{}{}: {};", name, optional, member_type));
            }
        }
        sb.add_line("}");

        debug!(class = %type_name, "rendered class");
        self.observer.on_event(RenderEvent::ClassRendered { name: type_name });
        Ok(())
    }

    fn heritage_clause(&self, class: &Class, as_class: bool) -> String {
        let base = class
            .base
            .map(|base| self.resolver.qualified_type_name(&TypeRef::Class(base)));
        let interfaces: Vec<String> = class
            .interfaces
            .iter()
            .map(|interface| self.resolver.qualified_type_name(&TypeRef::Class(*interface)))
            .collect();

        if class.is_interface {
            let all: Vec<String> = base.into_iter().chain(interfaces).collect();
            if all.is_empty() {
                return String::new();
            }
            return format!(" extends {}", all.join(", "));
        }

        let mut clause = String::new();
        match base {
            Some(base) => {
                clause.push_str(&format!(" extends {}", base));
                if !interfaces.is_empty() {
                    let joiner = if as_class { " implements " } else { ", " };
                    clause.push_str(joiner);
                    clause.push_str(&interfaces.join(", "));
                }
            }
            None if !interfaces.is_empty() => {
                let keyword = if as_class { "implements" } else { "extends" };
                clause.push_str(&format!(" {} {}", keyword, interfaces.join(", ")));
            }
            None => {}
        }
        clause
    }

    fn selects(&self, member: &Property) -> bool {
        if member.is_ignored {
            return false;
        }
        match member.kind {
            MemberKind::Property => self.mode.contains(OutputMode::PROPERTIES),
            MemberKind::Field => self.mode.contains(OutputMode::FIELDS),
            MemberKind::Constant => false,
        }
    }

    /// Members to declare, keyed and sorted by display name
    fn collect_members(&self, class: &'a Class) -> GenerateResult<Vec<(String, &'a Property)>> {
        let mut candidates: Vec<&'a Property> =
            class.members.iter().filter(|m| self.selects(m)).collect();
        if self.classes_variant && !class.is_interface {
            candidates.extend(self.inherited_contract_members(class));
        }

        let mut seen = HashSet::new();
        let mut members: Vec<(String, &'a Property)> = Vec::with_capacity(candidates.len());
        for member in candidates {
            let name = self.resolver.member_name(member);
            if seen.insert(name.clone()) {
                members.push((name, member));
            }
        }
        members.sort_by(|a, b| a.0.cmp(&b.0));

        if self.classes_variant {
            if let Some((_, member)) = members.iter().find(|(_, m)| m.ty.is_placeholder()) {
                return Err(GenerateError::UntypedMember {
                    class: class.name.clone(),
                    member: member.name.clone(),
                });
            }
        }
        Ok(members)
    }

    fn sorted_constants(&self, class: &'a Class) -> Vec<(String, &'a Property)> {
        let mut constants: Vec<(String, &'a Property)> = class
            .members
            .iter()
            .filter(|m| m.is_constant() && !m.is_ignored)
            .map(|m| (self.resolver.member_name(m), m))
            .collect();
        constants.sort_by(|a, b| a.0.cmp(&b.0));
        constants
    }

    /// Members of contracts that the base chain does not already implement
    fn inherited_contract_members(&self, class: &'a Class) -> Vec<&'a Property> {
        let satisfied = match class.base {
            Some(base) => self.contract_closure(base),
            None => HashSet::new(),
        };

        let mut visited = HashSet::new();
        let mut members = Vec::new();
        for interface in &class.interfaces {
            self.collect_contract_members(*interface, &satisfied, &mut visited, &mut members);
        }
        members
    }

    fn collect_contract_members(
        &self,
        id: ClassId,
        satisfied: &HashSet<ClassId>,
        visited: &mut HashSet<ClassId>,
        members: &mut Vec<&'a Property>,
    ) {
        if satisfied.contains(&id) || !visited.insert(id) {
            return;
        }
        let contract = self.model.class(id);
        members.extend(contract.members.iter().filter(|m| self.selects(m)));
        for parent in &contract.interfaces {
            self.collect_contract_members(*parent, satisfied, visited, members);
        }
    }

    /// Every contract implemented anywhere along a class's base chain
    fn contract_closure(&self, start: ClassId) -> HashSet<ClassId> {
        fn add(model: &TypeModel, id: ClassId, closure: &mut HashSet<ClassId>) {
            if closure.insert(id) {
                for parent in &model.class(id).interfaces {
                    add(model, *parent, closure);
                }
            }
        }

        let mut closure = HashSet::new();
        let mut current = Some(start);
        while let Some(id) = current {
            let class = self.model.class(id);
            for interface in &class.interfaces {
                add(self.model, *interface, &mut closure);
            }
            current = class.base;
        }
        closure
    }

    fn append_constant_module(&self, id: ClassId, sb: &mut ScriptBuilder) {
        let class = self.model.class(id);
        let type_name = if class.generic_arguments.is_empty() {
            self.resolver.type_name(&TypeRef::Class(id))
        } else {
            class.name.clone()
        };

        sb.add_line(&format!(
            "{}namespace {} {{",
            self.visibility(Declaration::Class(class), &type_name),
            type_name
        ));
        {
            let mut body = sb.indent();
            for (name, constant) in self.sorted_constants(class) {
                let constant_type = self.resolver.member_type_name(constant);
                self.docs
                    .append_property_doc(&mut body, constant, &name, &constant_type);
                body.add_line(&format!(
                    "export const {}: {} = {};",
                    name,
                    constant_type,
                    constant_literal(constant.constant_value.as_ref())
                ));
            }
        }
        sb.add_line("}");
    }

    fn append_enum(&mut self, id: EnumId, sb: &mut ScriptBuilder) {
        let enumeration = self.model.enumeration(id);
        let type_name = self.resolver.type_name(&TypeRef::Enum(id));
        let const_specifier = if self.options.const_enums.unwrap_or(enumeration.emit_as_const) {
            "const "
        } else {
            ""
        };
        let wide = self.options.enum_style == EnumStyle::Number && enumeration.has_wide_values();
        let wide_marker = if wide { " /* int64 */" } else { "" };

        self.docs.append_enum_doc(sb, enumeration, &type_name);
        sb.add_line(&format!(
            "{}{}enum {}{} {{",
            self.visibility(Declaration::Enum(enumeration), &type_name),
            const_specifier,
            type_name,
            wide_marker
        ));
        {
            let mut body = sb.indent();
            let count = enumeration.values.len();
            for (i, value) in enumeration.values.iter().enumerate() {
                self.docs.append_enum_value_doc(&mut body, value);
                let literal = match self.options.enum_style {
                    EnumStyle::Number => match &value.value {
                        EnumLiteral::Number(n) => n.to_string(),
                        EnumLiteral::String(s) => quote(s),
                    },
                    EnumStyle::String => quote(&value.name),
                };
                let separator = if i + 1 < count { "," } else { "" };
                body.add_line(&format!("{} = {}{}", value.name, literal, separator));
            }
        }
        sb.add_line("}");

        debug!(enumeration = %type_name, "rendered enum");
        self.observer.on_event(RenderEvent::EnumRendered { name: type_name });
    }
}

fn quote(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029");
    format!("\"{}\"", escaped)
}

fn constant_literal(value: Option<&ConstantValue>) -> String {
    match value {
        Some(ConstantValue::Boolean(b)) => b.to_string(),
        Some(ConstantValue::Integer(n)) => n.to_string(),
        Some(ConstantValue::Float(f)) if f.is_nan() => "NaN".to_string(),
        Some(ConstantValue::Float(f)) if f.is_infinite() => {
            if f.is_sign_positive() { "Infinity" } else { "-Infinity" }.to_string()
        }
        Some(ConstantValue::Float(f)) => f.to_string(),
        Some(ConstantValue::String(s)) => quote(s),
        None => "null".to_string(),
    }
}
