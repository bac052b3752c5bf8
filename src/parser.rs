//! Recursive-descent parser for the pattern grammar.
//!
//! The grammar is mode-dependent: `unicode_mode` (the `u` flag, plus a
//! forced-on scope while parsing group-name escapes) selects between the
//! code-point and legacy code-unit rules, and `named_mode` gates `\k<name>`
//! references. Backreferences are recorded while parsing and validated in a
//! post-pass once the whole pattern (and therefore the full group table) is
//! known, which is what makes forward references legal.

use std::collections::HashMap;

use crate::ast::{
    Alternative, Assertion, Atom, CharacterClass, ClassEscapeKind, ClassMember, Disjunction,
    Group, ParsedPattern, PropertyEscape, Quantifier, Term,
};
use crate::error::PatternSyntaxError;
use crate::flags::Flags;
use crate::unicode::{
    is_closing_syntax_character, is_control_letter, is_decimal_digit, is_hex_digit,
    is_identifier_continue, is_identifier_part, is_identifier_start, is_leading_surrogate,
    is_syntax_character, is_trailing_surrogate, surrogate_pair_to_code_point, PropertyDatabase,
};

type ParseResult<T> = Result<T, PatternSyntaxError>;

/// Parses `source` into a validated AST plus group table.
///
/// Pure in (source, flags, properties): no side effects beyond the returned
/// value, and the first error aborts the parse.
pub fn parse(
    source: &str,
    flags: Flags,
    properties: &dyn PropertyDatabase,
) -> ParseResult<ParsedPattern> {
    Parser::new(source, flags, properties).parse_pattern()
}

struct Parser<'a> {
    source: Vec<char>,
    position: usize,
    unicode_mode: bool,
    named_mode: bool,
    properties: &'a dyn PropertyDatabase,
    capturing_groups: usize,
    group_names: HashMap<String, usize>,
    /// (reference value, source offset), validated post-parse.
    decimal_escapes: Vec<(usize, usize)>,
    /// (referenced name, source offset), validated post-parse.
    name_refs: Vec<(String, usize)>,
}

impl<'a> Parser<'a> {
    fn new(source: &str, flags: Flags, properties: &'a dyn PropertyDatabase) -> Self {
        Self {
            source: source.chars().collect(),
            position: 0,
            unicode_mode: flags.unicode,
            named_mode: flags.named_groups,
            properties,
            capturing_groups: 0,
            group_names: HashMap::new(),
            decimal_escapes: Vec::new(),
            name_refs: Vec::new(),
        }
    }

    fn raise<T>(&self, message: impl Into<String>) -> ParseResult<T> {
        Err(PatternSyntaxError::new(message, self.position))
    }

    fn raise_at<T>(&self, message: impl Into<String>, offset: usize) -> ParseResult<T> {
        Err(PatternSyntaxError::new(message, offset))
    }

    fn at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.position).copied()
    }

    fn test(&self, c: char) -> bool {
        self.peek() == Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.test(c) {
            self.position += 1;
            return true;
        }
        false
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    fn expect(&mut self, c: char) -> ParseResult<()> {
        if !self.eat(c) {
            return match self.peek() {
                Some(got) => self.raise(format!("Expected {c:?} but got {got:?}")),
                None => self.raise(format!("Expected {c:?} but got end of pattern")),
            };
        }
        Ok(())
    }

    /// True when the source at the current position starts with `s`.
    fn lookahead(&self, s: &str) -> bool {
        let mut pos = self.position;
        for c in s.chars() {
            if self.source.get(pos) != Some(&c) {
                return false;
            }
            pos += 1;
        }
        true
    }

    // Pattern ::
    //   Disjunction
    fn parse_pattern(mut self) -> ParseResult<ParsedPattern> {
        let disjunction = self.parse_disjunction()?;
        if !self.at_end() {
            return self.raise("Unexpected token");
        }
        self.validate_references()?;
        Ok(ParsedPattern {
            disjunction,
            group_count: self.capturing_groups,
            group_names: self.group_names,
        })
    }

    /// Post-parse reference validation, run against the complete group
    /// table. Errors point at the recorded offset of the reference.
    fn validate_references(&self) -> ParseResult<()> {
        for &(value, offset) in &self.decimal_escapes {
            if value > self.capturing_groups {
                return self.raise_at("Invalid decimal escape", offset);
            }
        }
        for (name, offset) in &self.name_refs {
            if !self.group_names.contains_key(name) {
                return self.raise_at("Invalid group name", *offset);
            }
        }
        Ok(())
    }

    // Disjunction ::
    //   Alternative
    //   Alternative `|` Disjunction
    fn parse_disjunction(&mut self) -> ParseResult<Disjunction> {
        let mut alternatives = vec![self.parse_alternative()?];
        while self.eat('|') {
            alternatives.push(self.parse_alternative()?);
        }
        Ok(Disjunction { alternatives })
    }

    // Alternative ::
    //   [empty]
    //   Alternative Term
    fn parse_alternative(&mut self) -> ParseResult<Alternative> {
        let mut terms = Vec::new();
        while let Some(c) = self.peek() {
            if is_closing_syntax_character(c) {
                break;
            }
            terms.push(self.parse_term()?);
        }
        Ok(Alternative { terms })
    }

    // Term ::
    //   Assertion
    //   Atom
    //   Atom Quantifier
    fn parse_term(&mut self) -> ParseResult<Term> {
        if let Some(assertion) = self.maybe_parse_assertion()? {
            return Ok(Term::Assertion(assertion));
        }
        let parens_before = self.capturing_groups;
        let atom = self.parse_atom()?;
        let quantifier = self.maybe_parse_quantifier()?;
        Ok(Term::Atom {
            atom,
            quantifier,
            parens_before,
        })
    }

    // Assertion ::
    //   `^`
    //   `$`
    //   `\` `b`
    //   `\` `B`
    //   `(` `?` `=` Disjunction `)`
    //   `(` `?` `!` Disjunction `)`
    //   `(` `?` `<=` Disjunction `)`
    //   `(` `?` `<!` Disjunction `)`
    fn maybe_parse_assertion(&mut self) -> ParseResult<Option<Assertion>> {
        if self.eat('^') {
            return Ok(Some(Assertion::Start));
        }
        if self.eat('$') {
            return Ok(Some(Assertion::End));
        }
        if self.lookahead("\\b") {
            self.position += 2;
            return Ok(Some(Assertion::WordBoundary));
        }
        if self.lookahead("\\B") {
            self.position += 2;
            return Ok(Some(Assertion::NotWordBoundary));
        }
        for (prefix, negated, behind) in [
            ("(?=", false, false),
            ("(?!", true, false),
            ("(?<=", false, true),
            ("(?<!", true, true),
        ] {
            if self.lookahead(prefix) {
                self.position += prefix.len();
                let disjunction = self.parse_disjunction()?;
                self.expect(')')?;
                let assertion = if behind {
                    Assertion::Lookbehind {
                        negated,
                        disjunction,
                    }
                } else {
                    Assertion::Lookahead {
                        negated,
                        disjunction,
                    }
                };
                return Ok(Some(assertion));
            }
        }
        Ok(None)
    }

    // Quantifier ::
    //   QuantifierPrefix
    //   QuantifierPrefix `?`
    // QuantifierPrefix ::
    //   `*`
    //   `+`
    //   `?`
    //   `{` DecimalDigits `}`
    //   `{` DecimalDigits `,` `}`
    //   `{` DecimalDigits `,` DecimalDigits `}`
    fn maybe_parse_quantifier(&mut self) -> ParseResult<Option<Quantifier>> {
        let bounds = if self.eat('*') {
            Some((0, None))
        } else if self.eat('+') {
            Some((1, None))
        } else if self.eat('?') {
            Some((0, Some(1)))
        } else if self.eat('{') {
            let min = self.parse_decimal_digits()?;
            let max = if self.eat(',') {
                if self.test('}') {
                    None
                } else {
                    let max = self.parse_decimal_digits()?;
                    if min > max {
                        return self.raise("Numbers out of order in quantifier");
                    }
                    Some(max)
                }
            } else {
                Some(min)
            };
            self.expect('}')?;
            Some((min, max))
        } else {
            None
        };
        Ok(bounds.map(|(min, max)| Quantifier {
            min,
            max,
            greedy: !self.eat('?'),
        }))
    }

    // Atom ::
    //   PatternCharacter
    //   `.`
    //   `\` AtomEscape
    //   CharacterClass
    //   `(` GroupSpecifier Disjunction `)`
    //   `(` `?` `:` Disjunction `)`
    fn parse_atom(&mut self) -> ParseResult<Atom> {
        if self.eat('.') {
            return Ok(Atom::Dot);
        }
        if self.eat('\\') {
            return self.parse_atom_escape();
        }
        if self.eat('(') {
            return self.parse_group();
        }
        if self.test('[') {
            return Ok(Atom::Class(self.parse_character_class()?));
        }
        match self.peek() {
            Some(c) if is_syntax_character(c) => {
                self.raise(format!("Expected a PatternCharacter but got {c:?}"))
            }
            Some(c) => {
                self.position += 1;
                Ok(Atom::Character(c as u32))
            }
            None => self.raise("Unexpected end of pattern"),
        }
    }

    /// The opening `(` has already been consumed. The capture index is fixed
    /// here, before the body is parsed, so nested groups number themselves
    /// after this one.
    fn parse_group(&mut self) -> ParseResult<Atom> {
        let parens_before = self.capturing_groups;
        let mut capturing = true;
        let mut name = None;
        if self.eat('?') {
            if self.eat(':') {
                capturing = false;
            } else {
                name = Some(self.parse_group_name()?);
            }
        }
        let index = if capturing {
            self.capturing_groups += 1;
            Some(self.capturing_groups)
        } else {
            None
        };
        if let Some(name) = &name {
            if self.group_names.contains_key(name) {
                return self.raise(format!("Duplicate group specifier {name:?}"));
            }
            self.group_names.insert(name.clone(), parens_before + 1);
        }
        let disjunction = self.parse_disjunction()?;
        self.expect(')')?;
        Ok(Atom::Group(Group {
            index,
            name,
            disjunction,
            parens_before,
            enclosed_parens: self.capturing_groups - parens_before,
        }))
    }

    // AtomEscape ::
    //   DecimalEscape
    //   CharacterClassEscape
    //   CharacterEscape
    //   [+N] `k` GroupName
    fn parse_atom_escape(&mut self) -> ParseResult<Atom> {
        if self.named_mode && self.eat('k') {
            let offset = self.position;
            let name = self.parse_group_name()?;
            self.name_refs.push((name.clone(), offset));
            return Ok(Atom::NamedBackreference { name });
        }
        if let Some(member) = self.maybe_parse_character_class_escape()? {
            return Ok(match member {
                ClassMember::ClassEscape(kind) => Atom::ClassEscape(kind),
                ClassMember::Property(property) => Atom::Property(property),
                _ => unreachable!("class escape parser only yields escapes"),
            });
        }
        if let Some(index) = self.maybe_parse_decimal_escape() {
            return Ok(Atom::Backreference { index });
        }
        Ok(Atom::Character(self.parse_character_escape()?))
    }

    // DecimalEscape ::
    //   NonZeroDigit DecimalDigits? [lookahead != DecimalDigit]
    fn maybe_parse_decimal_escape(&mut self) -> Option<usize> {
        match self.peek() {
            Some(c) if is_decimal_digit(c) && c != '0' => {
                let start = self.position;
                let mut digits = String::new();
                while let Some(c) = self.peek() {
                    if !is_decimal_digit(c) {
                        break;
                    }
                    digits.push(c);
                    self.position += 1;
                }
                // An overflowing value always exceeds the group count and is
                // rejected by the post-pass.
                let value = digits.parse().unwrap_or(usize::MAX);
                self.decimal_escapes.push((value, start));
                Some(value)
            }
            _ => None,
        }
    }

    // CharacterEscape ::
    //   ControlEscape
    //   `c` ControlLetter
    //   `0` [lookahead ∉ DecimalDigit]
    //   HexEscapeSequence
    //   RegExpUnicodeEscapeSequence
    //   IdentityEscape
    fn parse_character_escape(&mut self) -> ParseResult<u32> {
        match self.peek() {
            Some('f') => {
                self.position += 1;
                Ok(0x0C)
            }
            Some('n') => {
                self.position += 1;
                Ok(0x0A)
            }
            Some('r') => {
                self.position += 1;
                Ok(0x0D)
            }
            Some('t') => {
                self.position += 1;
                Ok(0x09)
            }
            Some('v') => {
                self.position += 1;
                Ok(0x0B)
            }
            Some('c') => {
                self.position += 1;
                match self.next() {
                    Some(c) if is_control_letter(c) => Ok((c as u32) % 32),
                    Some(c) => self.identity_escape(c),
                    None => self.identity_escape('c'),
                }
            }
            Some('x') => {
                self.position += 1;
                if is_hex_digit_at(&self.source, self.position)
                    && is_hex_digit_at(&self.source, self.position + 1)
                {
                    return self.scan_hex(2);
                }
                self.identity_escape('x')
            }
            Some('u') => {
                if let Some(value) = self.maybe_parse_unicode_escape_sequence()? {
                    return Ok(value);
                }
                self.position += 1;
                self.identity_escape('u')
            }
            Some(_) => {
                let c = self.next().expect("peeked character");
                if c == '0' && !self.peek().is_some_and(is_decimal_digit) {
                    return Ok(0);
                }
                self.identity_escape(c)
            }
            None => self.raise("Unexpected escape"),
        }
    }

    // IdentityEscape ::
    //   [+U] SyntaxCharacter
    //   [+U] `/`
    //   [~U] SourceCharacter but not UnicodeIDContinue
    fn identity_escape(&self, c: char) -> ParseResult<u32> {
        let legal = if self.unicode_mode {
            is_syntax_character(c) || c == '/'
        } else {
            !is_identifier_continue(c)
        };
        if legal {
            Ok(c as u32)
        } else {
            self.raise("Invalid identity escape")
        }
    }

    // CharacterClassEscape ::
    //   `d`
    //   `D`
    //   `s`
    //   `S`
    //   `w`
    //   `W`
    //   [+U] `p{` UnicodePropertyValueExpression `}`
    //   [+U] `P{` UnicodePropertyValueExpression `}`
    fn maybe_parse_character_class_escape(&mut self) -> ParseResult<Option<ClassMember>> {
        let kind = match self.peek() {
            Some('d') => Some(ClassEscapeKind::Digit),
            Some('D') => Some(ClassEscapeKind::NotDigit),
            Some('s') => Some(ClassEscapeKind::Space),
            Some('S') => Some(ClassEscapeKind::NotSpace),
            Some('w') => Some(ClassEscapeKind::Word),
            Some('W') => Some(ClassEscapeKind::NotWord),
            _ => None,
        };
        if let Some(kind) = kind {
            self.position += 1;
            return Ok(Some(ClassMember::ClassEscape(kind)));
        }
        match self.peek() {
            Some(c @ ('p' | 'P')) if self.unicode_mode => {
                self.position += 1;
                let negated = c == 'P';
                Ok(Some(ClassMember::Property(
                    self.parse_property_expression(negated)?,
                )))
            }
            _ => Ok(None),
        }
    }

    // UnicodePropertyValueExpression ::
    //   UnicodePropertyName `=` UnicodePropertyValue
    //   LoneUnicodePropertyNameOrValue
    fn parse_property_expression(&mut self, negated: bool) -> ParseResult<PropertyEscape> {
        self.expect('{')?;
        let name = self.parse_property_word()?;
        if name.is_empty() {
            return self.raise("Invalid unicode property name or value");
        }
        let value = if self.eat('=') {
            let value = self.parse_property_word()?;
            if value.is_empty() {
                return self.raise("Invalid unicode property value");
            }
            Some(value)
        } else {
            None
        };
        self.expect('}')?;
        let valid = match &value {
            Some(value) => self.properties.is_property_with_value(&name, value),
            None => self.properties.is_lone_property(&name),
        };
        if !valid {
            return self.raise("Invalid unicode property name or value");
        }
        Ok(PropertyEscape {
            negated,
            name,
            value,
        })
    }

    fn parse_property_word(&mut self) -> ParseResult<String> {
        let mut word = String::new();
        loop {
            if self.at_end() {
                return self.raise("Invalid unicode property name or value");
            }
            match self.peek() {
                Some(c) if is_decimal_digit(c) || c == '_' || is_control_letter(c) => {
                    self.position += 1;
                    word.push(c);
                }
                _ => break,
            }
        }
        Ok(word)
    }

    // CharacterClass ::
    //   `[` ClassRanges `]`
    //   `[` `^` ClassRanges `]`
    fn parse_character_class(&mut self) -> ParseResult<CharacterClass> {
        self.expect('[')?;
        let negated = self.eat('^');
        let members = self.parse_class_ranges()?;
        self.expect(']')?;
        Ok(CharacterClass { negated, members })
    }

    // ClassRanges ::
    //   [empty]
    //   NonemptyClassRanges
    fn parse_class_ranges(&mut self) -> ParseResult<Vec<ClassMember>> {
        let mut members = Vec::new();
        while !self.test(']') {
            if self.at_end() {
                return self.raise("Unexpected end of CharacterClass");
            }
            let atom = self.parse_class_atom()?;
            if self.eat('-') {
                let ClassMember::Single(start) = atom else {
                    return self.raise("Invalid class range");
                };
                if self.test(']') {
                    members.push(ClassMember::Single(start));
                    members.push(ClassMember::Single('-' as u32));
                } else {
                    let ClassMember::Single(end) = self.parse_class_atom()? else {
                        return self.raise("Invalid class range");
                    };
                    if start > end {
                        return self.raise("Invalid class range");
                    }
                    members.push(ClassMember::Range(start, end));
                }
            } else {
                members.push(atom);
            }
        }
        Ok(members)
    }

    // ClassAtom ::
    //   `-`
    //   ClassAtomNoDash
    // ClassAtomNoDash ::
    //   SourceCharacter but not one of `\` or `]` or `-`
    //   `\` ClassEscape
    // ClassEscape ::
    //   `b`
    //   [+U] `-`
    //   CharacterClassEscape
    //   CharacterEscape
    fn parse_class_atom(&mut self) -> ParseResult<ClassMember> {
        if self.eat('\\') {
            if self.eat('b') {
                // Backspace inside a class.
                return Ok(ClassMember::Single(0x08));
            }
            if self.unicode_mode && self.eat('-') {
                return Ok(ClassMember::Single('-' as u32));
            }
            if let Some(member) = self.maybe_parse_character_class_escape()? {
                return Ok(member);
            }
            return Ok(ClassMember::Single(self.parse_character_escape()?));
        }
        match self.next() {
            Some(c) => Ok(ClassMember::Single(c as u32)),
            None => self.raise("Unexpected end of CharacterClass"),
        }
    }

    // GroupName ::
    //   `<` RegExpIdentifierName `>`
    fn parse_group_name(&mut self) -> ParseResult<String> {
        self.expect('<')?;
        let name = self.parse_identifier_name()?;
        self.expect('>')?;
        Ok(name)
    }

    // RegExpIdentifierName ::
    //   RegExpIdentifierStart
    //   RegExpIdentifierName RegExpIdentifierPart
    fn parse_identifier_name(&mut self) -> ParseResult<String> {
        let mut buffer = String::new();
        loop {
            let check = if buffer.is_empty() {
                is_identifier_start
            } else {
                is_identifier_part
            };
            match self.peek() {
                Some('\\') => {
                    self.position += 1;
                    // Unicode escapes inside names always use the
                    // unicode-mode escape grammar.
                    let saved = self.unicode_mode;
                    self.unicode_mode = true;
                    let escape = self.maybe_parse_unicode_escape_sequence();
                    self.unicode_mode = saved;
                    let Some(value) = escape? else {
                        return self.raise("Invalid unicode escape");
                    };
                    let Some(c) = char::from_u32(value) else {
                        return self.raise("Invalid identifier escape");
                    };
                    if !check(c) {
                        return self.raise("Invalid identifier escape");
                    }
                    buffer.push(c);
                }
                Some(c) if check(c) => {
                    self.position += 1;
                    buffer.push(c);
                }
                _ => break,
            }
        }
        if buffer.is_empty() {
            return self.raise("Invalid empty identifier");
        }
        Ok(buffer)
    }

    // DecimalDigits ::
    //   DecimalDigit
    //   DecimalDigits DecimalDigit
    fn parse_decimal_digits(&mut self) -> ParseResult<usize> {
        let mut digits = String::new();
        if !self.peek().is_some_and(is_decimal_digit) {
            return self.raise("Invalid decimal digits");
        }
        while let Some(c) = self.peek() {
            if !is_decimal_digit(c) {
                break;
            }
            digits.push(c);
            self.position += 1;
        }
        match digits.parse() {
            Ok(value) => Ok(value),
            Err(_) => self.raise("Invalid decimal digits"),
        }
    }

    fn scan_hex(&mut self, length: usize) -> ParseResult<u32> {
        let mut value = 0u32;
        for _ in 0..length {
            match self.peek() {
                Some(c) if is_hex_digit(c) => {
                    self.position += 1;
                    value = (value << 4) | c.to_digit(16).expect("hex digit");
                }
                _ => return self.raise("Invalid hex digit"),
            }
        }
        Ok(value)
    }

    // RegExpUnicodeEscapeSequence ::
    //   [+U] `u` HexLeadSurrogate `\u` HexTrailSurrogate
    //   [+U] `u` HexLeadSurrogate
    //   [+U] `u` HexTrailSurrogate
    //   [+U] `u` HexNonSurrogate
    //   [~U] `u` Hex4Digits
    //   [+U] `u{` CodePoint `}`
    fn maybe_parse_unicode_escape_sequence(&mut self) -> ParseResult<Option<u32>> {
        let start = self.position;
        if !self.eat('u') {
            return Ok(None);
        }
        if self.unicode_mode && self.eat('{') {
            let mut digits = 0usize;
            let mut value = 0u32;
            while let Some(c) = self.peek() {
                if !is_hex_digit(c) {
                    break;
                }
                self.position += 1;
                digits += 1;
                value = (value << 4) | c.to_digit(16).expect("hex digit");
                if value > 0x10FFFF {
                    return self.raise("Invalid code point");
                }
            }
            if digits == 0 || !self.eat('}') {
                return self.raise("Invalid code point");
            }
            return Ok(Some(value));
        }
        let Ok(lead) = self.scan_hex(4) else {
            self.position = start;
            return Ok(None);
        };
        if self.unicode_mode && is_leading_surrogate(lead) {
            let back = self.position;
            if self.eat('\\') && self.eat('u') {
                if let Ok(trail) = self.scan_hex(4) {
                    if is_trailing_surrogate(trail) {
                        return Ok(Some(surrogate_pair_to_code_point(lead, trail)));
                    }
                }
            }
            self.position = back;
        }
        Ok(Some(lead))
    }
}

fn is_hex_digit_at(source: &[char], position: usize) -> bool {
    source.get(position).copied().is_some_and(is_hex_digit)
}
