#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CapStyle {
    Flat,
    Square,
    Round,
    Triangle,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum LineJoin {
    Miter,
    Bevel,
    Round,
    MiterOrBevel(f32),
}

#[derive(Clone, PartialEq, Debug)]
pub enum DashStyle {
    Solid,
    Dash,
    Dot,
    DashDot,
    DashDotDot,
    Custom(Vec<f32>),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Dash {
    pub cap: CapStyle,
    pub style: DashStyle,
    pub offset: f32,
}

impl Default for Dash {
    #[inline]
    fn default() -> Self {
        Self {
            cap: CapStyle::Flat,
            style: DashStyle::Solid,
            offset: 0.0,
        }
    }
}

/// Device-independent description of how a stroke is drawn.
#[derive(Clone, PartialEq, Debug)]
pub struct StrokeStyleProperties {
    pub start_cap: CapStyle,
    pub end_cap: CapStyle,
    pub line_join: LineJoin,
    pub dash: Option<Dash>,
}

impl Default for StrokeStyleProperties {
    #[inline]
    fn default() -> Self {
        Self {
            start_cap: CapStyle::Flat,
            end_cap: CapStyle::Flat,
            line_join: LineJoin::Miter,
            dash: None,
        }
    }
}

impl StrokeStyleProperties {
    /// Miter limit handed to the native stroke style.
    #[inline]
    pub fn miter_limit(&self) -> f32 {
        match self.line_join {
            LineJoin::MiterOrBevel(limit) => limit,
            _ => 1.0,
        }
    }

    #[inline]
    pub fn custom_dashes(&self) -> Option<&[f32]> {
        match self.dash.as_ref().map(|dash| &dash.style) {
            Some(DashStyle::Custom(dashes)) => Some(dashes),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_dashes_test() {
        let props = StrokeStyleProperties {
            dash: Some(Dash {
                style: DashStyle::Custom(vec![4.0, 2.0]),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(props.custom_dashes(), Some(&[4.0, 2.0][..]));
        assert_eq!(StrokeStyleProperties::default().custom_dashes(), None);
    }

    #[test]
    fn miter_limit_test() {
        let props = StrokeStyleProperties {
            line_join: LineJoin::MiterOrBevel(4.0),
            ..Default::default()
        };
        assert_eq!(props.miter_limit(), 4.0);
        assert_eq!(StrokeStyleProperties::default().miter_limit(), 1.0);
    }
}
