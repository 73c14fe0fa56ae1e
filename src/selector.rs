use crate::dom::{Dom, NodeId};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorAttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
    StartsWith { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorPseudoClass {
    Checked,
    Disabled,
    Invalid,
    Not(Vec<Vec<SelectorPart>>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    pub(crate) tag: Option<String>,
    pub(crate) universal: bool,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<SelectorAttrCondition>,
    pub(crate) pseudo_classes: Vec<SelectorPseudoClass>,
}

impl SelectorStep {
    fn id_only(&self) -> Option<&str> {
        if !self.universal
            && self.tag.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudo_classes.is_empty()
        {
            self.id.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectorCombinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorPart {
    pub(crate) step: SelectorStep,
    // Relation to the previous (left) selector part.
    pub(crate) combinator: Option<SelectorCombinator>,
}

/// A comma-separated selector list, parsed into match groups.
pub(crate) fn parse_selector_list(selector: &str) -> Result<Vec<Vec<SelectorPart>>> {
    let mut groups = Vec::new();
    for group in split_top_level(selector, ',') {
        let group = group.trim();
        if group.is_empty() {
            return Err(Error::UnsupportedSelector(selector.into()));
        }
        groups.push(parse_selector_chain(group)?);
    }
    if groups.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    Ok(groups)
}

/// Fast-path probe: `Some(id)` when the whole list is a single bare `#id`.
pub(crate) fn id_only_of_list(groups: &[Vec<SelectorPart>]) -> Option<&str> {
    match groups {
        [group] => match group.as_slice() {
            [part] => part.step.id_only(),
            _ => None,
        },
        _ => None,
    }
}

fn parse_selector_chain(selector: &str) -> Result<Vec<SelectorPart>> {
    let tokens = tokenize_selector(selector)?;
    let mut parts: Vec<SelectorPart> = Vec::new();
    let mut pending_child = false;

    for token in tokens {
        if token == ">" {
            if pending_child || parts.is_empty() {
                return Err(Error::UnsupportedSelector(selector.into()));
            }
            pending_child = true;
            continue;
        }
        if token == "+" || token == "~" {
            return Err(Error::UnsupportedSelector(selector.into()));
        }

        let step = parse_selector_step(&token)?;
        let combinator = if parts.is_empty() {
            None
        } else if pending_child {
            Some(SelectorCombinator::Child)
        } else {
            Some(SelectorCombinator::Descendant)
        };
        pending_child = false;
        parts.push(SelectorPart { step, combinator });
    }

    if parts.is_empty() || pending_child {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    Ok(parts)
}

/// Splits on `sep` while ignoring separators inside quotes, brackets, and
/// parentheses, so `[name="productos[]"]` stays whole.
fn split_top_level(input: &str, sep: char) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;

    for ch in input.chars() {
        if let Some(q) = quote {
            current.push(ch);
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' | '(' => {
                depth += 1;
                current.push(ch);
            }
            ']' | ')' => {
                depth -= 1;
                current.push(ch);
            }
            _ if ch == sep && depth == 0 => {
                out.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    out.push(current);
    out
}

fn tokenize_selector(selector: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;

    for ch in selector.chars() {
        if let Some(q) = quote {
            current.push(ch);
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' | '(' => {
                depth += 1;
                current.push(ch);
            }
            ']' | ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(Error::UnsupportedSelector(selector.into()));
                }
                current.push(ch);
            }
            ch if ch.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            '>' | '+' | '~' if depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(ch.to_string());
            }
            _ => current.push(ch),
        }
    }

    if quote.is_some() || depth != 0 {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

fn read_name(chars: &[char], mut i: usize) -> (String, usize) {
    let mut name = String::new();
    while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '-' || chars[i] == '_')
    {
        name.push(chars[i]);
        i += 1;
    }
    (name, i)
}

fn parse_selector_step(token: &str) -> Result<SelectorStep> {
    let mut step = SelectorStep::default();
    let chars: Vec<char> = token.chars().collect();
    let mut i = 0usize;

    if i < chars.len() && chars[i] == '*' {
        step.universal = true;
        i += 1;
    } else if i < chars.len() && (chars[i].is_ascii_alphabetic() || chars[i] == '_') {
        let (name, next) = read_name(&chars, i);
        step.tag = Some(name.to_ascii_lowercase());
        i = next;
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                let (name, next) = read_name(&chars, i + 1);
                if name.is_empty() {
                    return Err(Error::UnsupportedSelector(token.into()));
                }
                step.id = Some(name);
                i = next;
            }
            '.' => {
                let (name, next) = read_name(&chars, i + 1);
                if name.is_empty() {
                    return Err(Error::UnsupportedSelector(token.into()));
                }
                step.classes.push(name);
                i = next;
            }
            '[' => {
                let (condition, next) = parse_attr_condition(token, &chars, i + 1)?;
                step.attrs.push(condition);
                i = next;
            }
            ':' => {
                let (pseudo, next) = parse_pseudo_class(token, &chars, i + 1)?;
                step.pseudo_classes.push(pseudo);
                i = next;
            }
            _ => return Err(Error::UnsupportedSelector(token.into())),
        }
    }

    if step.tag.is_none()
        && !step.universal
        && step.id.is_none()
        && step.classes.is_empty()
        && step.attrs.is_empty()
        && step.pseudo_classes.is_empty()
    {
        return Err(Error::UnsupportedSelector(token.into()));
    }
    Ok(step)
}

fn parse_attr_condition(
    token: &str,
    chars: &[char],
    mut i: usize,
) -> Result<(SelectorAttrCondition, usize)> {
    let mut key = String::new();
    while i < chars.len() && chars[i] != ']' && chars[i] != '=' && chars[i] != '^' {
        key.push(chars[i]);
        i += 1;
    }
    let key = key.trim().to_string();
    if key.is_empty() {
        return Err(Error::UnsupportedSelector(token.into()));
    }

    if i < chars.len() && chars[i] == ']' {
        return Ok((SelectorAttrCondition::Exists { key }, i + 1));
    }

    let starts_with = chars.get(i) == Some(&'^');
    if starts_with {
        i += 1;
    }
    if chars.get(i) != Some(&'=') {
        return Err(Error::UnsupportedSelector(token.into()));
    }
    i += 1;

    let mut value = String::new();
    let quote = match chars.get(i) {
        Some('"') => {
            i += 1;
            Some('"')
        }
        Some('\'') => {
            i += 1;
            Some('\'')
        }
        _ => None,
    };
    while i < chars.len() {
        let ch = chars[i];
        match quote {
            Some(q) if ch == q => {
                i += 1;
                break;
            }
            None if ch == ']' => break,
            _ => {
                value.push(ch);
                i += 1;
            }
        }
    }
    if chars.get(i) != Some(&']') {
        return Err(Error::UnsupportedSelector(token.into()));
    }
    i += 1;

    let condition = if starts_with {
        SelectorAttrCondition::StartsWith { key, value }
    } else {
        SelectorAttrCondition::Eq { key, value }
    };
    Ok((condition, i))
}

fn parse_pseudo_class(
    token: &str,
    chars: &[char],
    mut i: usize,
) -> Result<(SelectorPseudoClass, usize)> {
    let mut name = String::new();
    while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '-') {
        name.push(chars[i]);
        i += 1;
    }

    if chars.get(i) == Some(&'(') {
        let mut depth = 1i32;
        let mut inner = String::new();
        i += 1;
        while i < chars.len() && depth > 0 {
            match chars[i] {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
            if depth > 0 {
                inner.push(chars[i]);
            }
            i += 1;
        }
        if depth != 0 {
            return Err(Error::UnsupportedSelector(token.into()));
        }
        return match name.as_str() {
            "not" => Ok((SelectorPseudoClass::Not(parse_selector_list(&inner)?), i)),
            _ => Err(Error::UnsupportedSelector(token.into())),
        };
    }

    let pseudo = match name.as_str() {
        "checked" => SelectorPseudoClass::Checked,
        "disabled" => SelectorPseudoClass::Disabled,
        "invalid" => SelectorPseudoClass::Invalid,
        _ => return Err(Error::UnsupportedSelector(token.into())),
    };
    Ok((pseudo, i))
}

pub(crate) fn matches_selector_list(dom: &Dom, node: NodeId, groups: &[Vec<SelectorPart>]) -> bool {
    groups.iter().any(|parts| matches_chain(dom, node, parts))
}

fn matches_chain(dom: &Dom, node: NodeId, parts: &[SelectorPart]) -> bool {
    let Some((last, prefix)) = parts.split_last() else {
        return false;
    };
    if !matches_step(dom, node, &last.step) {
        return false;
    }
    let Some(combinator) = last.combinator else {
        return true;
    };
    match combinator {
        SelectorCombinator::Child => dom
            .parent(node)
            .map(|parent| matches_chain(dom, parent, prefix))
            .unwrap_or(false),
        SelectorCombinator::Descendant => {
            let mut cursor = dom.parent(node);
            while let Some(ancestor) = cursor {
                if dom.element(ancestor).is_some() && matches_chain(dom, ancestor, prefix) {
                    return true;
                }
                cursor = dom.parent(ancestor);
            }
            false
        }
    }
}

fn matches_step(dom: &Dom, node: NodeId, step: &SelectorStep) -> bool {
    let Some(tag_name) = dom.tag_name(node) else {
        return false;
    };
    if let Some(tag) = &step.tag {
        if !tag_name.eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    if let Some(id) = &step.id {
        if dom.attr(node, "id") != Some(id.as_str()) {
            return false;
        }
    }
    for class in &step.classes {
        if !dom.has_class(node, class) {
            return false;
        }
    }
    for condition in &step.attrs {
        let ok = match condition {
            SelectorAttrCondition::Exists { key } => dom.attr(node, key).is_some(),
            SelectorAttrCondition::Eq { key, value } => dom.attr(node, key) == Some(value.as_str()),
            SelectorAttrCondition::StartsWith { key, value } => dom
                .attr(node, key)
                .map(|actual| !value.is_empty() && actual.starts_with(value.as_str()))
                .unwrap_or(false),
        };
        if !ok {
            return false;
        }
    }
    for pseudo in &step.pseudo_classes {
        let ok = match pseudo {
            SelectorPseudoClass::Checked => dom.checked(node),
            SelectorPseudoClass::Disabled => dom.disabled(node),
            SelectorPseudoClass::Invalid => {
                dom.is_form_control(node) && !dom.control_validity_ok(node)
            }
            SelectorPseudoClass::Not(groups) => !matches_selector_list(dom, node, groups),
        };
        if !ok {
            return false;
        }
    }
    true
}
