use std::iter::Peekable;
use std::str::Chars;

use log::warn;

use crate::description::{ SceneDescription, ShapeDescription,
    GeometryDescription, LightDescription, TextureDescription };
use crate::error::SceneError;

/// A token of the block text format.
#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Number(f64),
    Symbol(char),
}

/// The value on the right hand side of `key = value`.
#[derive(Clone, Debug, PartialEq)]
enum Value {
    Number(f64),
    Word(String),
    Tuple(Vec<f64>),
}

/// A parsed `kind { key = value ... }` block.
#[derive(Clone, Debug)]
struct Block {
    kind: String,
    line: usize,
    entries: Vec<(String, Value)>,
}

/// Parses a scene in the block text format.
///
/// A scene is a sequence of blocks; `#` starts a comment running to the end
/// of the line:
///
/// ```text
/// # a red ball on a grey floor
/// sphere { center = (0, -1, 3) radius = 1 color = (255, 0, 0) specular = 500 }
/// plane { point = (0, -2, 0) normal = (0, 1, 0) color = (200, 200, 200) }
/// light { type = ambient intensity = 0.2 }
/// light { type = point intensity = 0.6 position = (2, 1, 0) }
/// ```
///
/// Known block kinds are `sphere`, `plane`, `triangle`, `light`, `camera` and
/// `scene`. Unknown keys are ignored with a warning; unknown blocks and
/// missing required keys are errors.
///
/// ```
/// # use phong_tracer::parser::parse;
/// let d = parse("light { type = ambient intensity = 0.5 }").unwrap();
/// assert_eq!(d.lights.len(), 1);
/// ```
pub fn parse(text: &str) -> Result<SceneDescription, SceneError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, pos: 0 };
    let mut description = SceneDescription::default();

    while let Some(block) = parser.block()? {
        apply(&mut description, &block)?;
    }

    Ok(description)
}

fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, SceneError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let mut line = 1;

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            },

            c if c.is_whitespace() => {
                chars.next();
            },

            '#' => {
                while let Some(&c) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
            },

            '{' | '}' | '(' | ')' | ',' | '=' => {
                tokens.push((Token::Symbol(c), line));
                chars.next();
            },

            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                let number = take_while(&mut chars, |c| {
                    c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '+'
                });

                let value = number.parse::<f64>().map_err(|_| SceneError::Syntax {
                    line,
                    message: format!("`{}` is not a number", number),
                })?;
                tokens.push((Token::Number(value), line));
            },

            c if c.is_alphabetic() || c == '_' => {
                let ident = take_while(&mut chars, |c| c.is_alphanumeric() || c == '_');
                tokens.push((Token::Ident(ident), line));
            },

            c => return Err(SceneError::Syntax {
                line,
                message: format!("unexpected character `{}`", c),
            }),
        }
    }

    Ok(tokens)
}

fn take_while<F: Fn(char) -> bool>(chars: &mut Peekable<Chars>, f: F) -> String {
    let mut s = String::new();
    while let Some(&c) = chars.peek() {
        if !f(c) {
            break;
        }

        s.push(c);
        chars.next();
    }

    s
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    /// The line of the current token, or of the last one at the end of input.
    fn line(&self) -> usize {
        self.tokens.get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |&(_, line)| line)
    }

    fn error(&self, message: &str) -> SceneError {
        SceneError::Syntax { line: self.line(), message: message.into() }
    }

    fn peek_symbol(&self, symbol: char) -> bool {
        matches!(self.tokens.get(self.pos), Some((Token::Symbol(c), _)) if *c == symbol)
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<(), SceneError> {
        if self.peek_symbol(symbol) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected `{}`", symbol)))
        }
    }

    fn ident(&mut self, what: &str) -> Result<String, SceneError> {
        match self.tokens.get(self.pos) {
            Some((Token::Ident(name), _)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            },
            _ => Err(self.error(&format!("expected {}", what))),
        }
    }

    fn number(&mut self) -> Result<f64, SceneError> {
        match self.tokens.get(self.pos) {
            Some(&(Token::Number(x), _)) => {
                self.pos += 1;
                Ok(x)
            },
            _ => Err(self.error("expected a number")),
        }
    }

    /// Parses the next block, or returns `None` at the end of input.
    fn block(&mut self) -> Result<Option<Block>, SceneError> {
        if self.pos >= self.tokens.len() {
            return Ok(None);
        }

        let line = self.line();
        let kind = self.ident("a block name")?;
        self.expect_symbol('{')?;

        let mut entries = Vec::new();
        while !self.peek_symbol('}') {
            if self.pos >= self.tokens.len() {
                return Err(SceneError::Syntax {
                    line,
                    message: format!("`{}` block is never closed", kind),
                });
            }

            let key = self.ident("a key or `}`")?;
            self.expect_symbol('=')?;
            let value = self.value()?;
            entries.push((key, value));
        }
        self.expect_symbol('}')?;

        Ok(Some(Block { kind, line, entries }))
    }

    fn value(&mut self) -> Result<Value, SceneError> {
        if self.peek_symbol('(') {
            self.pos += 1;

            let mut values = vec![self.number()?];
            while self.peek_symbol(',') {
                self.pos += 1;
                values.push(self.number()?);
            }

            self.expect_symbol(')')?;
            return Ok(Value::Tuple(values));
        }

        let value = match self.tokens.get(self.pos) {
            Some(&(Token::Number(x), _)) => Value::Number(x),
            Some((Token::Ident(word), _)) => Value::Word(word.clone()),
            _ => return Err(self.error("expected a value")),
        };

        self.pos += 1;
        Ok(value)
    }
}

impl Block {
    fn name(&self) -> String {
        format!("{} on line {}", self.kind, self.line)
    }

    /// The last value given for `key`.
    fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    fn invalid(&self, key: &str, message: &str) -> SceneError {
        SceneError::InvalidValue {
            block: self.name(),
            field: key.into(),
            message: message.into(),
        }
    }

    fn require<T>(&self, key: &str, value: Option<T>) -> Result<T, SceneError> {
        value.ok_or_else(|| SceneError::MissingField {
            block: self.name(),
            field: key.into(),
        })
    }

    fn number(&self, key: &str) -> Result<Option<f64>, SceneError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(x)) => Ok(Some(*x)),
            Some(_) => Err(self.invalid(key, "expected a number")),
        }
    }

    fn tuple(&self, key: &str, len: usize) -> Result<Option<Vec<f64>>, SceneError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Tuple(values)) if values.len() == len => Ok(Some(values.clone())),
            Some(_) => Err(self.invalid(key,
                &format!("expected a tuple of {} numbers", len))),
        }
    }

    fn triple(&self, key: &str) -> Result<Option<[f64; 3]>, SceneError> {
        Ok(self.tuple(key, 3)?.map(|v| [v[0], v[1], v[2]]))
    }

    fn pair(&self, key: &str) -> Result<Option<[f64; 2]>, SceneError> {
        Ok(self.tuple(key, 2)?.map(|v| [v[0], v[1]]))
    }

    fn word(&self, key: &str) -> Result<Option<&str>, SceneError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Word(w)) => Ok(Some(w.as_str())),
            Some(_) => Err(self.invalid(key, "expected a name")),
        }
    }

    fn flag(&self, key: &str) -> Result<Option<bool>, SceneError> {
        match self.word(key)? {
            None => Ok(None),
            Some("true") => Ok(Some(true)),
            Some("false") => Ok(Some(false)),
            Some(_) => Err(self.invalid(key, "expected `true` or `false`")),
        }
    }

    /// Warns about keys this block does not know.
    fn warn_unknown_keys(&self, known: &[&str]) {
        for (key, _) in self.entries.iter() {
            if !known.contains(&key.as_str()) {
                warn!("{}: ignoring unknown key `{}`.", self.name(), key);
            }
        }
    }
}

const MATERIAL_KEYS: [&str; 5] = ["color", "specular", "reflective", "texture", "shadow"];

fn shape(block: &Block, geometry: GeometryDescription, keys: &[&str])
    -> Result<ShapeDescription, SceneError> {
    let known: Vec<&str> = keys.iter().chain(MATERIAL_KEYS.iter()).cloned().collect();
    block.warn_unknown_keys(&known);

    let texture = match block.word("texture")? {
        None => None,
        Some("checker") => Some(TextureDescription::default()),
        Some(other) => return Err(SceneError::UnknownTexture(other.into())),
    };

    Ok(ShapeDescription {
        geometry,
        color: Some(block.require("color", block.triple("color")?)?),
        specular: block.number("specular")?,
        reflective: block.number("reflective")?,
        texture,
        shadow: block.flag("shadow")?,
    })
}

fn light(block: &Block) -> Result<LightDescription, SceneError> {
    let kind = block.require("type", block.word("type")?)?;
    let intensity = block.require("intensity", block.number("intensity")?)?;

    Ok(match kind {
        "ambient" => {
            block.warn_unknown_keys(&["type", "intensity"]);
            LightDescription::Ambient { intensity }
        },

        "point" => {
            block.warn_unknown_keys(&["type", "intensity", "position", "attenuation"]);
            LightDescription::Point {
                intensity,
                position: block.require("position", block.triple("position")?)?,
                attenuation: block.triple("attenuation")?,
            }
        },

        "directional" => {
            block.warn_unknown_keys(&["type", "intensity", "direction"]);
            LightDescription::Directional {
                intensity,
                direction: block.require("direction", block.triple("direction")?)?,
            }
        },

        other => return Err(SceneError::UnknownLightType(other.into())),
    })
}

fn apply(d: &mut SceneDescription, block: &Block) -> Result<(), SceneError> {
    match block.kind.as_str() {
        "sphere" => {
            let geometry = GeometryDescription::Sphere {
                center: block.require("center", block.triple("center")?)?,
                radius: block.require("radius", block.number("radius")?)?,
            };
            d.shapes.push(shape(block, geometry, &["center", "radius"])?);
        },

        "plane" => {
            let geometry = GeometryDescription::Plane {
                point: block.require("point", block.triple("point")?)?,
                normal: block.require("normal", block.triple("normal")?)?,
            };
            d.shapes.push(shape(block, geometry, &["point", "normal"])?);
        },

        "triangle" => {
            let geometry = GeometryDescription::Triangle {
                v0: block.require("v0", block.triple("v0")?)?,
                v1: block.require("v1", block.triple("v1")?)?,
                v2: block.require("v2", block.triple("v2")?)?,
            };
            d.shapes.push(shape(block, geometry, &["v0", "v1", "v2"])?);
        },

        "light" => d.lights.push(light(block)?),

        "camera" => {
            block.warn_unknown_keys(&["position", "viewport", "distance"]);
            if let Some(position) = block.triple("position")? {
                d.camera.position = position;
            }
            if let Some(viewport) = block.pair("viewport")? {
                d.camera.viewport = viewport;
            }
            if let Some(distance) = block.number("distance")? {
                d.camera.distance = distance;
            }
        },

        "scene" => {
            block.warn_unknown_keys(&["background"]);
            if let Some(background) = block.triple("background")? {
                d.background = background;
            }
        },

        other => return Err(SceneError::UnknownBlock(other.into())),
    }

    Ok(())
}

#[test]
fn parse_every_block_kind() {
    let text = "
        # a comment
        sphere { center = (0, -1, 3) radius = 1 color = (255, 0, 0)
                 specular = 500 reflective = 0.2 texture = checker }
        plane { point = (0, -2, 0) normal = (0, 1, 0) color = (200, 200, 200) shadow = false }
        triangle { v0 = (-1, 0, 5) v1 = (1, 0, 5) v2 = (0, 1.5, 5) color = (0, 255, 0) }
        light { type = ambient intensity = 0.2 }
        light { type = point intensity = 0.6 position = (2, 1, 0) attenuation = (1, 0, 0) }
        light { type = directional intensity = 0.2 direction = (1, 4, 4) } # trailing
        camera { position = (0, 0, -1) viewport = (2, 1.5) distance = 1 }
        scene { background = (10, 20, 30) }
    ";

    let d = parse(text).expect("Scene should parse.");

    assert_eq!(d.shapes.len(), 3);
    assert_eq!(d.shapes[0].geometry,
        GeometryDescription::Sphere { center: [0.0, -1.0, 3.0], radius: 1.0 });
    assert_eq!(d.shapes[0].specular, Some(500.0));
    assert_eq!(d.shapes[0].reflective, Some(0.2));
    assert_eq!(d.shapes[0].texture, Some(TextureDescription::default()));
    assert_eq!(d.shapes[1].shadow, Some(false));
    assert_eq!(d.shapes[2].geometry, GeometryDescription::Triangle {
        v0: [-1.0, 0.0, 5.0], v1: [1.0, 0.0, 5.0], v2: [0.0, 1.5, 5.0],
    });

    assert_eq!(d.lights, vec![
        LightDescription::Ambient { intensity: 0.2 },
        LightDescription::Point {
            intensity: 0.6,
            position: [2.0, 1.0, 0.0],
            attenuation: Some([1.0, 0.0, 0.0]),
        },
        LightDescription::Directional { intensity: 0.2, direction: [1.0, 4.0, 4.0] },
    ]);

    assert_eq!(d.camera.position, [0.0, 0.0, -1.0]);
    assert_eq!(d.camera.viewport, [2.0, 1.5]);
    assert_eq!(d.background, [10.0, 20.0, 30.0]);
}

#[test]
fn defaults_are_left_to_conversion() {
    let d = parse("sphere { center = (0, 0, 0) radius = 2 color = (1, 2, 3) }")
        .expect("Scene should parse.");

    assert_eq!(d.shapes[0].specular, None);
    assert_eq!(d.shapes[0].reflective, None);
    assert_eq!(d.shapes[0].texture, None);
    assert_eq!(d.camera, Default::default());
}

#[test]
fn empty_input_is_an_empty_scene() {
    let d = parse("  # nothing here\n").expect("Scene should parse.");
    assert_eq!(d, SceneDescription::default());
}

#[test]
fn missing_key_is_an_error() {
    let err = parse("\n\nsphere { center = (0, 0, 0) color = (1, 2, 3) }").unwrap_err();
    assert_eq!(err, SceneError::MissingField {
        block: "sphere on line 3".into(),
        field: "radius".into(),
    });
}

#[test]
fn unknown_block_is_an_error() {
    let err = parse("cube { size = 1 }").unwrap_err();
    assert_eq!(err, SceneError::UnknownBlock("cube".into()));
}

#[test]
fn unknown_light_and_texture_are_errors() {
    assert_eq!(parse("light { type = spot intensity = 1 }").unwrap_err(),
        SceneError::UnknownLightType("spot".into()));
    assert_eq!(parse("sphere { center = (0,0,0) radius = 1 color = (1,1,1) texture = marble }")
        .unwrap_err(), SceneError::UnknownTexture("marble".into()));
}

#[test]
fn unknown_keys_are_ignored() {
    let d = parse("light { type = ambient intensity = 0.3 colour = (1, 1, 1) }")
        .expect("Scene should parse.");
    assert_eq!(d.lights, vec![LightDescription::Ambient { intensity: 0.3 }]);
}

#[test]
fn syntax_errors_carry_line_numbers() {
    let err = parse("light {\n type = ambient\n intensity 0.3 }").unwrap_err();
    assert!(matches!(err, SceneError::Syntax { line: 3, .. }));

    let err = parse("light { type = ambient intensity = 0.3").unwrap_err();
    assert!(matches!(err, SceneError::Syntax { line: 1, .. }));

    let err = parse("sphere { radius = 1.2.3 }").unwrap_err();
    assert!(matches!(err, SceneError::Syntax { line: 1, .. }));
}

#[test]
fn wrong_value_shape_is_invalid() {
    let err = parse("sphere { center = 3 radius = 1 color = (1, 2, 3) }").unwrap_err();
    assert!(matches!(err, SceneError::InvalidValue { ref field, .. } if field == "center"));

    let err = parse("light { type = point intensity = 1 position = (1, 2) }").unwrap_err();
    assert!(matches!(err, SceneError::InvalidValue { ref field, .. } if field == "position"));
}

#[test]
fn negative_and_exponent_numbers() {
    let d = parse("plane { point = (-1.5, -2e1, +3) normal = (0, 1, 0) color = (0, 0, 0) }")
        .expect("Scene should parse.");

    assert_eq!(d.shapes[0].geometry, GeometryDescription::Plane {
        point: [-1.5, -20.0, 3.0],
        normal: [0.0, 1.0, 0.0],
    });
}
