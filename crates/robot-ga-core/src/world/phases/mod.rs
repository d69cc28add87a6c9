mod evaluation;
mod exploration;
mod generation;
mod motion;
